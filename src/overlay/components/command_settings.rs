//! Commands tab: command groups and their ordered command lists

use crate::common::constants::settings_ui::*;
use crate::config::{ButtonStyle, CommandGroups, Config, GroupError};
use crate::overlay::components::command_dialog::{
    CommandDialogOutcome, CommandEntry, render_command_entry_modal,
};
use eframe::egui;

/// State for the commands tab
#[derive(Default)]
pub struct CommandSettingsState {
    selected_group: Option<String>,
    renaming_group: Option<String>,
    rename_buffer: String,
    new_group_buffer: String,
    /// Command entry dialog, open when Some
    entry: Option<CommandEntry>,
    error: Option<String>,
}

impl CommandSettingsState {
    /// Keep the selection pointing at an existing group
    fn sync_selection(&mut self, groups: &CommandGroups) {
        let valid = self
            .selected_group
            .as_deref()
            .is_some_and(|name| groups.get(name).is_some());
        if !valid {
            self.selected_group = groups.iter().next().map(|g| g.name.clone());
        }
    }

    fn report(&mut self, result: Result<(), GroupError>) -> bool {
        match result {
            Ok(()) => {
                self.error = None;
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

/// Name for a new group that does not collide with existing ones
fn unique_group_name(groups: &CommandGroups, base: &str) -> String {
    let mut name = base.to_string();
    let mut counter = 1;
    while groups.get(&name).is_some() {
        counter += 1;
        name = format!("{base} {counter}");
    }
    name
}

pub fn ui(ui: &mut egui::Ui, draft: &mut Config, state: &mut CommandSettingsState) {
    let Config {
        command_groups,
        button_style,
        ..
    } = draft;
    state.sync_selection(command_groups);

    ui.columns(2, |columns| {
        render_group_column(&mut columns[0], command_groups, state);
        render_command_column(&mut columns[1], command_groups, button_style, state);
    });

    if let Some(error) = &state.error {
        ui.add_space(ITEM_SPACING);
        ui.colored_label(COLOR_ERROR, format!("⚠ {error}"));
    }
}

fn render_group_column(
    ui: &mut egui::Ui,
    groups: &mut CommandGroups,
    state: &mut CommandSettingsState,
) {
    ui.heading("Groups");
    ui.add_space(ITEM_SPACING);

    ui.horizontal(|ui| {
        ui.add(
            egui::TextEdit::singleline(&mut state.new_group_buffer)
                .hint_text("New group")
                .desired_width(120.0),
        );
        if ui.button("➕ Add").clicked() {
            let name = if state.new_group_buffer.trim().is_empty() {
                unique_group_name(groups, "New Group")
            } else {
                state.new_group_buffer.trim().to_string()
            };
            if state.report(groups.add_group(&name)) {
                state.selected_group = Some(name);
                state.new_group_buffer.clear();
            }
        }
    });

    ui.add_space(ITEM_SPACING);
    ui.separator();

    let names: Vec<(String, bool)> = groups
        .iter()
        .map(|g| (g.name.clone(), g.active))
        .collect();
    let mut to_delete = None;

    egui::ScrollArea::vertical()
        .id_salt("command_groups_scroll")
        .show(ui, |ui| {
            for (name, active) in names {
                ui.horizontal(|ui| {
                    let mut active = active;
                    if ui
                        .checkbox(&mut active, "")
                        .on_hover_text("Show this group on the overlay")
                        .changed()
                    {
                        let result = groups.set_active(&name, active);
                        state.report(result);
                    }

                    if state.renaming_group.as_deref() == Some(name.as_str()) {
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut state.rename_buffer)
                                .desired_width(120.0),
                        );
                        if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                            state.renaming_group = None;
                        } else if response.lost_focus()
                            || ui.input(|i| i.key_pressed(egui::Key::Enter))
                        {
                            let new_name = state.rename_buffer.trim().to_string();
                            if state.report(groups.rename_group(&name, &new_name))
                                && state.selected_group.as_deref() == Some(name.as_str())
                            {
                                state.selected_group = Some(new_name);
                            }
                            state.renaming_group = None;
                        } else if !response.has_focus() {
                            response.request_focus();
                        }
                    } else {
                        let selected = state.selected_group.as_deref() == Some(name.as_str());
                        if ui.selectable_label(selected, &name).clicked() {
                            state.selected_group = Some(name.clone());
                        }
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("🗑").on_hover_text("Delete group").clicked() {
                            to_delete = Some(name.clone());
                        }
                        if ui.small_button("✏").on_hover_text("Rename group").clicked() {
                            state.renaming_group = Some(name.clone());
                            state.rename_buffer = name.clone();
                        }
                    });
                });
            }
        });

    if let Some(name) = to_delete {
        let result = groups.remove_group(&name).map(|_| ());
        state.report(result);
        state.sync_selection(groups);
    }

    if groups.is_empty() {
        ui.label(egui::RichText::new("No command groups.").weak());
    }
}

fn render_command_column(
    ui: &mut egui::Ui,
    groups: &mut CommandGroups,
    button_style: &ButtonStyle,
    state: &mut CommandSettingsState,
) {
    let Some(group_name) = state.selected_group.clone() else {
        ui.label(egui::RichText::new("Select or add a group").weak());
        return;
    };
    let Some(group) = groups.get(&group_name) else {
        return;
    };
    let commands = group.commands.clone();

    ui.horizontal(|ui| {
        ui.heading(&group_name);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("➕ Add Command").clicked() {
                state.entry = Some(CommandEntry::default());
            }
        });
    });
    ui.add_space(ITEM_SPACING);

    let mut from_idx = None;
    let mut to_idx = None;
    let mut to_delete = None;

    egui::ScrollArea::vertical()
        .id_salt("group_commands_scroll")
        .show(ui, |ui| {
            let frame = egui::Frame::default()
                .inner_margin(4.0)
                .stroke(ui.visuals().widgets.noninteractive.bg_stroke);

            let (_, dropped_payload) = ui.dnd_drop_zone::<usize, ()>(frame, |ui| {
                ui.set_min_height(100.0);

                for (row_idx, command) in commands.iter().enumerate() {
                    let item_id = egui::Id::new("group_command_item").with(row_idx);

                    let response = ui
                        .horizontal(|ui| {
                            let drag_source = ui.dnd_drag_source(item_id, row_idx, |ui| {
                                ui.horizontal(|ui| {
                                    ui.label(egui::RichText::new("::").weak());
                                    ui.label(command);
                                });
                            });

                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui
                                        .small_button("✖")
                                        .on_hover_text("Remove command")
                                        .clicked()
                                    {
                                        to_delete = Some(row_idx);
                                    }
                                },
                            );
                            drag_source.response
                        })
                        .inner;

                    if let (Some(pointer), Some(hovered_payload)) = (
                        ui.input(|i| i.pointer.interact_pos()),
                        response.dnd_hover_payload::<usize>(),
                    ) {
                        let rect = response.rect;
                        let stroke = egui::Stroke::new(2.0, ui.visuals().selection.stroke.color);

                        let insert_row_idx = if *hovered_payload == row_idx {
                            ui.painter().hline(rect.x_range(), rect.center().y, stroke);
                            row_idx
                        } else if pointer.y < rect.center().y {
                            ui.painter().hline(rect.x_range(), rect.top(), stroke);
                            row_idx
                        } else {
                            ui.painter().hline(rect.x_range(), rect.bottom(), stroke);
                            row_idx + 1
                        };

                        if let Some(dragged_payload) = response.dnd_release_payload::<usize>() {
                            from_idx = Some(*dragged_payload);
                            to_idx = Some(insert_row_idx);
                        }
                    }
                }
            });

            if let Some(dragged_payload) = dropped_payload {
                from_idx = Some(*dragged_payload);
                to_idx = Some(commands.len());
            }

            if commands.is_empty() {
                ui.label(egui::RichText::new("No commands in this group.").weak());
            }
        });

    if let Some(idx) = to_delete {
        let result = groups.remove_command(&group_name, idx).map(|_| ());
        state.report(result);
    }

    if let (Some(from), Some(insert_at)) = (from_idx, to_idx)
        && let Some(to) = drop_target(from, insert_at, commands.len())
    {
        let result = groups.move_command(&group_name, from, to);
        state.report(result);
    }

    if let Some(entry) = state.entry.as_mut() {
        let outcome = render_command_entry_modal(ui.ctx(), &group_name, entry, button_style);
        match outcome {
            CommandDialogOutcome::Open => {}
            CommandDialogOutcome::Add(label) => {
                let result = groups.add_command(&group_name, &label);
                state.report(result);
                state.entry = None;
            }
            CommandDialogOutcome::Closed => state.entry = None,
        }
    }
}

/// Final index for a drag that ends at insertion point `insert_at`.
/// None when the drop leaves the order unchanged.
fn drop_target(from: usize, insert_at: usize, len: usize) -> Option<usize> {
    if from >= len {
        return None;
    }
    let to = if from < insert_at { insert_at - 1 } else { insert_at };
    let to = to.min(len - 1);
    (to != from).then_some(to)
}
