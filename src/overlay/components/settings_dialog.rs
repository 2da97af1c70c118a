//! Settings window shown in its own viewport
//!
//! All tabs edit a draft copy of the configuration. Save hands the draft to
//! `SharedState::apply_settings`; Cancel or closing the window discards it.

use crate::common::constants::settings_ui::*;
use crate::config::Config;
use crate::overlay::components::{appearance_settings, command_settings, hotkey_settings};
use crate::overlay::state::SharedState;
use crate::overlay::theme::{ButtonRole, styled_button};
use crate::overlay::{SettingsTab, StatusMessage};
use eframe::egui;
use tracing::{info, warn};

pub struct SettingsDialogState {
    draft: Config,
    active_tab: SettingsTab,
    hotkey_state: hotkey_settings::HotkeySettingsState,
    command_state: command_settings::CommandSettingsState,
    error: Option<String>,
    hotkeys_suspended: bool,
}

impl SettingsDialogState {
    pub fn new(config: &Config) -> Self {
        Self {
            draft: config.clone(),
            active_tab: SettingsTab::default(),
            hotkey_state: hotkey_settings::HotkeySettingsState::default(),
            command_state: command_settings::CommandSettingsState::default(),
            error: None,
            hotkeys_suspended: false,
        }
    }

    /// Reason Save is refused, if any
    fn validation_error(&self) -> Option<String> {
        if self.draft.prev_key == self.draft.next_key {
            return Some(format!(
                "Previous and next page cannot both use {}",
                self.draft.prev_key.display_name()
            ));
        }
        let invalid = self.draft.invalid_colors();
        (!invalid.is_empty()).then(|| format!("Invalid color in {}, use #RRGGBB", invalid.join(", ")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Open,
    Closed,
}

/// Render the settings viewport. Returns `Closed` once the dialog is done.
pub fn show(
    ctx: &egui::Context,
    shared: &mut SharedState,
    dialog: &mut SettingsDialogState,
) -> DialogOutcome {
    let viewport_id = egui::ViewportId::from_hash_of("settings_dialog");
    let builder = egui::ViewportBuilder::default()
        .with_title(WINDOW_TITLE)
        .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
        .with_always_on_top();

    ctx.show_viewport_immediate(viewport_id, builder, |ctx, _class| {
        if ctx.input(|i| i.viewport().close_requested()) {
            info!("Settings window closed, discarding changes");
            release_suspension(shared, dialog);
            return DialogOutcome::Closed;
        }

        let outcome = render(ctx, shared, dialog);
        sync_hotkey_suspension(shared, dialog);
        if outcome == DialogOutcome::Closed {
            release_suspension(shared, dialog);
        }
        outcome
    })
}

fn render(
    ctx: &egui::Context,
    shared: &mut SharedState,
    dialog: &mut SettingsDialogState,
) -> DialogOutcome {
    let mut outcome = DialogOutcome::Open;

    egui::TopBottomPanel::top("settings_tabs").show(ctx, |ui| {
        ui.add_space(ITEM_SPACING / 2.0);
        ui.horizontal(|ui| {
            for tab in SettingsTab::ALL {
                ui.selectable_value(&mut dialog.active_tab, tab, tab.label());
            }
        });
        ui.add_space(ITEM_SPACING / 2.0);
    });

    egui::TopBottomPanel::bottom("settings_actions").show(ctx, |ui| {
        ui.add_space(ITEM_SPACING);

        let validation = dialog.validation_error();
        if let Some(message) = validation.as_ref().or(dialog.error.as_ref()) {
            ui.colored_label(COLOR_ERROR, format!("⚠ {message}"));
        } else if let Some(StatusMessage { text, color }) = &shared.status_message {
            ui.colored_label(*color, text);
        }

        ui.horizontal(|ui| {
            let style = dialog.draft.button_style.clone();
            let save = ui.add_enabled(
                validation.is_none(),
                styled_button("💾 Save", ButtonRole::Save, &style),
            );
            if save.clicked() {
                release_suspension(shared, dialog);
                match shared.apply_settings(dialog.draft.clone()) {
                    Ok(()) => {
                        info!("Settings saved");
                        outcome = DialogOutcome::Closed;
                    }
                    Err(e) => {
                        warn!(error = %e, "Settings not applied");
                        dialog.error = Some(e.to_string());
                    }
                }
            }

            if ui
                .add(styled_button("✖ Cancel", ButtonRole::Cancel, &style))
                .clicked()
            {
                info!("Settings cancelled");
                outcome = DialogOutcome::Closed;
            }
        });
        ui.add_space(ITEM_SPACING);
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical().show(ui, |ui| match dialog.active_tab {
            SettingsTab::Appearance => appearance_settings::ui(ui, &mut dialog.draft),
            SettingsTab::Hotkeys => {
                hotkey_settings::ui(ui, &mut dialog.draft, &mut dialog.hotkey_state)
            }
            SettingsTab::Commands => {
                command_settings::ui(ui, &mut dialog.draft, &mut dialog.command_state)
            }
        });
    });

    hotkey_settings::render_key_capture_modal(ctx, &mut dialog.draft, &mut dialog.hotkey_state);

    outcome
}

/// Global grabs would swallow the keys being captured, so release them while capturing
fn sync_hotkey_suspension(shared: &mut SharedState, dialog: &mut SettingsDialogState) {
    let capturing = dialog.hotkey_state.is_dialog_open();
    if capturing && !dialog.hotkeys_suspended {
        shared.suspend_hotkeys();
        dialog.hotkeys_suspended = true;
    } else if !capturing {
        release_suspension(shared, dialog);
    }
}

fn release_suspension(shared: &mut SharedState, dialog: &mut SettingsDialogState) {
    if dialog.hotkeys_suspended {
        shared.resume_hotkeys();
        dialog.hotkeys_suspended = false;
    }
}
