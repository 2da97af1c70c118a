//! Overlay window implemented with egui/eframe and ksni system tray support

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use eframe::{NativeOptions, egui};
use ksni::TrayMethods;
use tokio::sync::Notify;
use tracing::{error, info, warn};

use crate::common::constants::config::GEOMETRY_SAVE_DELAY_MS;
use crate::common::constants::overlay::*;
use crate::common::types::{Dimensions, Position};
use crate::config::Config;
use crate::input::{DisabledBackend, HotkeyBackend, HotkeyRegistry, PageCommand, X11Backend};
use crate::overlay::components::settings_dialog::{self, DialogOutcome, SettingsDialogState};
use crate::overlay::components::tray::AppTray;
use crate::overlay::state::SharedState;
use crate::overlay::theme::{self, OverlayPalette};

struct OverlayApp {
    state: Arc<Mutex<SharedState>>,
    commands: Receiver<PageCommand>,

    // UI-only state
    settings: Option<SettingsDialogState>,
    hovered_line: Option<usize>,

    shutdown_signal: Arc<Notify>,
    update_signal: Arc<Notify>,
}

impl OverlayApp {
    fn new(cc: &eframe::CreationContext<'_>, config: Config, config_path: PathBuf) -> Self {
        info!("Initializing overlay");

        let (command_tx, command_rx) = mpsc::channel();
        let wake_ctx = cc.egui_ctx.clone();
        let backend: Box<dyn HotkeyBackend> =
            match X11Backend::spawn(command_tx, Box::new(move || wake_ctx.request_repaint())) {
                Ok(backend) => Box::new(backend),
                Err(e) => {
                    warn!(error = ?e, "Global hotkeys disabled");
                    Box::new(DisabledBackend::new())
                }
            };

        let state = Arc::new(Mutex::new(SharedState::new(
            config,
            config_path,
            HotkeyRegistry::new(backend),
        )));

        let shutdown_signal = Arc::new(Notify::new());
        let update_signal = Arc::new(Notify::new());
        spawn_tray(
            state.clone(),
            cc.egui_ctx.clone(),
            shutdown_signal.clone(),
            update_signal.clone(),
        );

        Self {
            state,
            commands: command_rx,
            settings: None,
            hovered_line: None,
            shutdown_signal,
            update_signal,
        }
    }
}

/// Run the tray icon on its own thread with a current-thread Tokio runtime
fn spawn_tray(
    state: Arc<Mutex<SharedState>>,
    ctx: egui::Context,
    shutdown: Arc<Notify>,
    update: Arc<Notify>,
) {
    let spawned = std::thread::Builder::new()
        .name("tray".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!(error = ?e, "Failed to build Tokio runtime for tray");
                    return;
                }
            };

            runtime.block_on(async move {
                let tray = AppTray { state, ctx };
                match tray.spawn().await {
                    Ok(handle) => {
                        info!("Tray icon created via ksni/D-Bus");
                        loop {
                            tokio::select! {
                                _ = shutdown.notified() => {
                                    handle.shutdown().await;
                                    break;
                                }
                                _ = update.notified() => {
                                    // Re-read tooltip and menu
                                    handle.update(|_| {}).await;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        error!(error = ?e, "Failed to create tray icon (D-Bus unavailable?)");
                    }
                }
            });
        });

    if let Err(e) = spawned {
        error!(error = ?e, "Failed to spawn tray thread");
    }
}

impl eframe::App for OverlayApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        // Transparent so the panel fill alpha shows through
        [0.0, 0.0, 0.0, 0.0]
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state_arc = self.state.clone();
        let mut state_guard = match state_arc.lock() {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to lock shared state: {:?}", e);
                return;
            }
        };
        let state = &mut *state_guard;

        let mut page_changed = false;
        while let Ok(command) = self.commands.try_recv() {
            page_changed |= state.handle_command(command);
        }

        if state.should_quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        ctx.set_visuals(theme::visuals(state.config.theme));
        ctx.style_mut(|style| style.interaction.selectable_labels = false);

        track_geometry(ctx, state);

        page_changed |= self.render_overlay(ctx, state);

        if state.show_settings && self.settings.is_none() {
            info!("Opening settings");
            self.settings = Some(SettingsDialogState::new(&state.config));
        }
        if let Some(dialog) = self.settings.as_mut()
            && settings_dialog::show(ctx, state, dialog) == DialogOutcome::Closed
        {
            self.settings = None;
            state.show_settings = false;
            page_changed = true;
        }

        if page_changed {
            self.update_signal.notify_one();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Ok(mut state) = self.state.lock() {
            state.hotkeys.clear();
            if let Err(err) = state.save_config() {
                error!(error = ?err, "Failed to save window geometry on exit");
            } else {
                info!("Window geometry saved on exit");
            }
        }

        self.shutdown_signal.notify_one();
        info!("Overlay exiting");
    }
}

impl OverlayApp {
    /// Draw the page label and commands. Returns true if the page changed.
    fn render_overlay(&mut self, ctx: &egui::Context, state: &mut SharedState) -> bool {
        let palette = OverlayPalette::from_config(&state.config);
        let font = egui::FontId::proportional(f32::from(state.config.font_size));
        let mut page_changed = false;
        let mut hovered_line = None;

        let frame = egui::Frame::NONE
            .fill(palette.background)
            .inner_margin(PADDING);

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            // Background interaction first so labels stay on top
            let background = ui.interact(
                ui.max_rect(),
                egui::Id::new("overlay_background"),
                egui::Sense::click_and_drag(),
            );
            if background.drag_started() {
                ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
            }
            background.context_menu(|ui| {
                if ui.button("Settings…").clicked() {
                    state.show_settings = true;
                    ui.close();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    state.should_quit = true;
                    ui.close();
                }
            });

            ui.spacing_mut().item_spacing.y = LINE_SPACING;

            ui.horizontal(|ui| {
                if ui.small_button("◀").on_hover_text("Previous page").clicked() {
                    page_changed |= state.handle_command(PageCommand::PreviousPage);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("▶").on_hover_text("Next page").clicked() {
                        page_changed |= state.handle_command(PageCommand::NextPage);
                    }
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            egui::RichText::new(state.pages.label())
                                .font(font.clone())
                                .strong()
                                .color(palette.text),
                        );
                    });
                });
            });

            ui.add_space(f32::from(PADDING));

            if state.pages.page_count() == 0 {
                ui.label(
                    egui::RichText::new("No active command groups")
                        .font(font.clone())
                        .color(palette.text)
                        .italics(),
                );
            }

            for (idx, command) in state.pages.current().iter().enumerate() {
                let color = palette.label_color(self.hovered_line == Some(idx));
                let response = ui.label(
                    egui::RichText::new(command)
                        .font(font.clone())
                        .color(color),
                );
                if response.hovered() {
                    hovered_line = Some(idx);
                }
            }

            if let Some(status) = &state.status_message {
                ui.add_space(f32::from(PADDING));
                ui.label(egui::RichText::new(&status.text).small().color(status.color));
            }

            render_resize_grip(ui);
        });

        if hovered_line != self.hovered_line {
            self.hovered_line = hovered_line;
            ctx.request_repaint();
        }
        page_changed
    }
}

/// Undecorated windows have no border to grab, so offer a corner handle
fn render_resize_grip(ui: &mut egui::Ui) {
    let size = egui::vec2(12.0, 12.0);
    let rect = egui::Rect::from_min_size(ui.max_rect().right_bottom() - size, size);
    let response = ui
        .interact(rect, egui::Id::new("overlay_resize"), egui::Sense::drag())
        .on_hover_cursor(egui::CursorIcon::ResizeSouthEast);

    let stroke = egui::Stroke::new(1.0, ui.visuals().weak_text_color());
    for offset in [4.0, 8.0] {
        ui.painter().line_segment(
            [
                egui::pos2(rect.right() - offset, rect.bottom()),
                egui::pos2(rect.right(), rect.bottom() - offset),
            ],
            stroke,
        );
    }

    if response.drag_started() {
        ui.ctx().send_viewport_cmd(egui::ViewportCommand::BeginResize(
            egui::viewport::ResizeDirection::SouthEast,
        ));
    }
}

/// Follow window moves and resizes, saving once the geometry settles
fn track_geometry(ctx: &egui::Context, state: &mut SharedState) {
    let (outer, inner) = ctx.input(|i| (i.viewport().outer_rect, i.viewport().inner_rect));
    let now = Instant::now();

    if let (Some(outer), Some(inner)) = (outer, inner)
        && let Some(size) = Dimensions::from_vec2(inner.size())
    {
        state.track_geometry(Position::from_pos2(outer.min), size, now);
    }

    state.flush_geometry(now);
    if state.geometry_pending() {
        ctx.request_repaint_after(Duration::from_millis(GEOMETRY_SAVE_DELAY_MS));
    }
}

pub fn run_overlay(config_path: PathBuf) -> Result<()> {
    let config = Config::load_from(&config_path);

    let viewport = egui::ViewportBuilder::default()
        .with_title(WINDOW_TITLE)
        .with_app_id(APP_ID)
        .with_decorations(false)
        .with_always_on_top()
        .with_transparent(true)
        .with_resizable(true)
        .with_position(config.window_position.to_pos2())
        .with_inner_size(config.window_size.to_vec2())
        .with_min_inner_size([MIN_WIDTH as f32, MIN_HEIGHT as f32]);

    let options = NativeOptions {
        viewport,
        ..Default::default()
    };

    info!(
        path = ?config_path,
        x = config.window_position.x,
        y = config.window_position.y,
        width = config.window_size.width,
        height = config.window_size.height,
        "Starting overlay"
    );

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(|cc| Ok(Box::new(OverlayApp::new(cc, config, config_path)))),
    )
    .map_err(|err| anyhow!("Failed to launch overlay: {err}"))
}
