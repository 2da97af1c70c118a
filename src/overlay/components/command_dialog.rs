//! Modal for adding a command to a group

use crate::common::constants::settings_ui::*;
use crate::config::ButtonStyle;
use crate::overlay::theme::{ButtonRole, styled_button};
use eframe::egui;

/// Fields of the command entry form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandEntry {
    pub name: String,
    pub alias: String,
    pub description: String,
}

impl CommandEntry {
    /// Overlay label, `NAME (ALIAS) - description`.
    /// The alias and description parts are left out when empty.
    /// Returns None when no command name was entered.
    pub fn label(&self) -> Option<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }

        let mut label = name.to_uppercase();
        let alias = self.alias.trim();
        if !alias.is_empty() {
            label.push_str(&format!(" ({})", alias.to_uppercase()));
        }
        let description = self.description.trim();
        if !description.is_empty() {
            label.push_str(" - ");
            label.push_str(description);
        }
        Some(label)
    }
}

pub enum CommandDialogOutcome {
    Open,
    Add(String),
    Closed,
}

pub fn render_command_entry_modal(
    ctx: &egui::Context,
    group: &str,
    entry: &mut CommandEntry,
    button_style: &ButtonStyle,
) -> CommandDialogOutcome {
    let mut open = true;
    let mut outcome = CommandDialogOutcome::Open;

    egui::Window::new(format!("Add Command to {group}"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.set_min_width(300.0);

            egui::Grid::new("command_entry_grid")
                .num_columns(2)
                .spacing([ITEM_SPACING, ITEM_SPACING])
                .show(ui, |ui| {
                    ui.label("Command:");
                    ui.add(egui::TextEdit::singleline(&mut entry.name).hint_text("LINE"));
                    ui.end_row();

                    ui.label("Alias:");
                    ui.add(egui::TextEdit::singleline(&mut entry.alias).hint_text("L"));
                    ui.end_row();

                    ui.label("Description:");
                    ui.add(
                        egui::TextEdit::singleline(&mut entry.description)
                            .hint_text("Draw a straight line"),
                    );
                    ui.end_row();
                });

            ui.add_space(ITEM_SPACING);
            let label = entry.label();
            match &label {
                Some(label) => ui.label(egui::RichText::new(label).weak()),
                None => ui.label(egui::RichText::new("Enter a command name").weak()),
            };

            ui.add_space(ITEM_SPACING);
            ui.separator();

            ui.horizontal(|ui| {
                let add = ui.add_enabled(
                    label.is_some(),
                    styled_button("Add", ButtonRole::Save, button_style),
                );
                if add.clicked()
                    && let Some(label) = label.clone()
                {
                    outcome = CommandDialogOutcome::Add(label);
                }

                if ui
                    .add(styled_button("Cancel", ButtonRole::Cancel, button_style))
                    .clicked()
                {
                    outcome = CommandDialogOutcome::Closed;
                }
            });
        });

    if !open {
        outcome = CommandDialogOutcome::Closed;
    }
    outcome
}
