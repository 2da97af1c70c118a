//! Hotkeys tab: page navigation bindings and the capture dialog

use std::time::Instant;

use crate::common::constants::settings_ui::*;
use crate::config::{Config, HotkeyBinding};
use crate::input::PageCommand;
use crate::overlay::key_capture::{CaptureResult, CaptureState};
use crate::overlay::theme::{ButtonRole, styled_button};
use eframe::egui;

/// State for the hotkey settings tab
#[derive(Default)]
pub struct HotkeySettingsState {
    capture_target: Option<PageCommand>,
    capture_state: Option<CaptureState>,
    /// Last finished capture, shown for confirmation
    capture_result: Option<CaptureResult>,
}

impl HotkeySettingsState {
    fn start_key_capture(&mut self, target: PageCommand) {
        self.capture_target = Some(target);
        self.capture_state = Some(CaptureState::new(Instant::now()));
        self.capture_result = None;
    }

    fn cancel_capture(&mut self) {
        self.capture_target = None;
        self.capture_state = None;
        self.capture_result = None;
    }

    /// True while the capture dialog is open
    pub fn is_dialog_open(&self) -> bool {
        self.capture_target.is_some()
    }

    fn is_capturing_for(&self, command: PageCommand) -> bool {
        self.capture_target == Some(command)
    }
}

fn command_label(command: PageCommand) -> &'static str {
    match command {
        PageCommand::PreviousPage => "Previous page",
        PageCommand::NextPage => "Next page",
    }
}

fn binding_mut(config: &mut Config, command: PageCommand) -> &mut HotkeyBinding {
    match command {
        PageCommand::PreviousPage => &mut config.prev_key,
        PageCommand::NextPage => &mut config.next_key,
    }
}

pub fn ui(ui: &mut egui::Ui, draft: &mut Config, state: &mut HotkeySettingsState) {
    ui.group(|ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new("Page Navigation").strong());
        ui.add_space(ITEM_SPACING);

        egui::Grid::new("page_hotkeys_grid")
            .num_columns(3)
            .spacing([ITEM_SPACING * 2.0, ITEM_SPACING])
            .show(ui, |ui| {
                for command in [PageCommand::PreviousPage, PageCommand::NextPage] {
                    ui.label(format!("{}:", command_label(command)));
                    ui.label(
                        egui::RichText::new(binding_mut(draft, command).display_name()).strong(),
                    );

                    let text = if state.is_capturing_for(command) {
                        "Capturing..."
                    } else {
                        "⌨ Change"
                    };
                    if ui
                        .add(styled_button(text, ButtonRole::Normal, &draft.button_style))
                        .clicked()
                    {
                        state.start_key_capture(command);
                    }
                    ui.end_row();
                }
            });

        ui.add_space(ITEM_SPACING);
        if draft.prev_key == draft.next_key {
            ui.colored_label(
                COLOR_ERROR,
                "⚠ Previous and next page must use different keys",
            );
        } else {
            ui.label(
                egui::RichText::new("Hotkeys work globally, even when another window has focus")
                    .small()
                    .weak(),
            );
        }
    });
}

/// Capture dialog. Writes the accepted binding into the draft.
pub fn render_key_capture_modal(
    ctx: &egui::Context,
    draft: &mut Config,
    state: &mut HotkeySettingsState,
) {
    let Some(target) = state.capture_target else {
        return;
    };

    if state.capture_result.is_none()
        && let Some(capture) = state.capture_state.as_mut()
    {
        let (modifiers, pressed) = ctx.input(|i| {
            let pressed: Vec<egui::Key> = i
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key, pressed: true, ..
                    } => Some(*key),
                    _ => None,
                })
                .collect();
            (i.modifiers, pressed)
        });

        match capture.process(modifiers, &pressed, Instant::now()) {
            Some(CaptureResult::Cancelled) => {
                state.cancel_capture();
                return;
            }
            Some(result) => state.capture_result = Some(result),
            None => ctx.request_repaint(),
        }
    }

    let mut open = true;
    egui::Window::new(format!("Set {} Hotkey", command_label(target)))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.set_min_width(280.0);

            let description = state
                .capture_state
                .as_ref()
                .map(|c| c.description.clone())
                .unwrap_or_default();

            match state.capture_result.clone() {
                None => {
                    ui.label("Press the new key combination. Escape cancels.");
                    ui.add_space(ITEM_SPACING);
                    ui.label(egui::RichText::new(description).heading().strong());
                    ui.add_space(ITEM_SPACING);
                    ui.separator();
                    if ui
                        .add(styled_button("✖ Cancel", ButtonRole::Cancel, &draft.button_style))
                        .clicked()
                    {
                        state.cancel_capture();
                    }
                }
                Some(CaptureResult::Captured(binding)) => {
                    ui.label("Captured:");
                    ui.label(egui::RichText::new(binding.display_name()).heading().strong());

                    let other = match target {
                        PageCommand::PreviousPage => &draft.next_key,
                        PageCommand::NextPage => &draft.prev_key,
                    };
                    if *other == binding {
                        ui.colored_label(COLOR_WARNING, "⚠ Already used by the other direction");
                    }

                    ui.add_space(ITEM_SPACING);
                    ui.separator();

                    let mut should_accept = false;
                    let mut should_retry = false;
                    let mut should_cancel = ui.input(|i| i.key_pressed(egui::Key::Escape));

                    ui.horizontal(|ui| {
                        if ui
                            .add(styled_button("💾 Accept", ButtonRole::Save, &draft.button_style))
                            .clicked()
                        {
                            should_accept = true;
                        }
                        if ui
                            .add(styled_button("⟲ Try Again", ButtonRole::Normal, &draft.button_style))
                            .clicked()
                        {
                            should_retry = true;
                        }
                        if ui
                            .add(styled_button("Cancel", ButtonRole::Cancel, &draft.button_style))
                            .clicked()
                        {
                            should_cancel = true;
                        }
                    });

                    if should_cancel {
                        state.cancel_capture();
                    } else if should_accept {
                        *binding_mut(draft, target) = binding;
                        state.cancel_capture();
                    } else if should_retry {
                        state.start_key_capture(target);
                    }
                }
                Some(CaptureResult::Timeout) => {
                    ui.colored_label(COLOR_WARNING, "Capture timed out (no key pressed)");
                    ui.add_space(ITEM_SPACING);
                    if ui.button("Close").clicked() {
                        state.cancel_capture();
                    }
                }
                Some(CaptureResult::Cancelled) => state.cancel_capture(),
            }
        });

    if !open {
        state.cancel_capture();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_lifecycle() {
        let mut state = HotkeySettingsState::default();
        assert!(!state.is_dialog_open());

        state.start_key_capture(PageCommand::NextPage);
        assert!(state.is_dialog_open());
        assert!(state.is_capturing_for(PageCommand::NextPage));
        assert!(!state.is_capturing_for(PageCommand::PreviousPage));

        state.cancel_capture();
        assert!(!state.is_dialog_open());
    }

    #[test]
    fn test_binding_targets() {
        let mut config = Config::default();
        *binding_mut(&mut config, PageCommand::NextPage) = "alt+n".parse().unwrap();
        assert_eq!(config.next_key.to_string(), "alt+n");
        assert_eq!(config.prev_key.to_string(), "ctrl+left");
    }
}
