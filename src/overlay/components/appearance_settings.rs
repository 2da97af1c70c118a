//! Appearance tab: theme, text, opacity, page size and button colors

use crate::common::color::{HexColor, Opacity, color32_to_hex};
use crate::common::constants::defaults::appearance::*;
use crate::common::constants::overlay::LINE_SPACING;
use crate::common::constants::settings_ui::*;
use crate::config::{Config, Theme};
use crate::overlay::pages::CommandPages;
use crate::overlay::theme::{ButtonRole, OverlayPalette, styled_button};
use eframe::egui;

pub fn ui(ui: &mut egui::Ui, draft: &mut Config) {
    ui.columns(2, |columns| {
        render_overlay_controls(&mut columns[0], draft);
        render_button_controls(&mut columns[1], draft);
    });

    ui.add_space(SECTION_SPACING);
    render_preview(ui, draft);
}

fn render_overlay_controls(ui: &mut egui::Ui, draft: &mut Config) {
    ui.group(|ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new("Overlay").strong());
        ui.add_space(ITEM_SPACING);

        ui.horizontal(|ui| {
            ui.label("Theme:");
            for theme in [Theme::Dark, Theme::Light] {
                ui.radio_value(&mut draft.theme, theme, theme.label());
            }
        });

        ui.add_space(ITEM_SPACING);

        ui.horizontal(|ui| {
            ui.label("Font Size:");
            ui.add(egui::Slider::new(
                &mut draft.font_size,
                FONT_SIZE_MIN..=FONT_SIZE_MAX,
            ));
        });

        ui.horizontal(|ui| {
            ui.label("Opacity:");
            let mut percent = Opacity::from_fraction(draft.opacity).percent();
            let min = Opacity::from_fraction(OPACITY_MIN).percent();
            let max = Opacity::from_fraction(OPACITY_MAX).percent();
            if ui
                .add(egui::Slider::new(&mut percent, min..=max).suffix("%"))
                .changed()
            {
                draft.opacity = f32::from(percent) / 100.0;
            }
        });

        ui.horizontal(|ui| {
            ui.label("Lines per Page:");
            ui.add(egui::Slider::new(
                &mut draft.lines_per_page,
                LINES_PER_PAGE_MIN..=LINES_PER_PAGE_MAX,
            ));
        });

        ui.add_space(ITEM_SPACING);

        color_row(ui, "Text Color:", &mut draft.text_color);
        ui.add_enabled_ui(draft.theme == Theme::Light, |ui| {
            color_row(ui, "Background:", &mut draft.bg_color);
        });
        if draft.theme == Theme::Dark {
            ui.label(
                egui::RichText::new("The dark theme always uses a black background")
                    .small()
                    .weak(),
            );
        }
    });
}

fn render_button_controls(ui: &mut egui::Ui, draft: &mut Config) {
    ui.group(|ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new("Dialog Buttons").strong());
        ui.add_space(ITEM_SPACING);

        let style = &mut draft.button_style;
        color_row(ui, "Background:", &mut style.background);
        color_row(ui, "Text:", &mut style.foreground);
        color_row(ui, "Save Text:", &mut style.save_foreground);
        color_row(ui, "Cancel Text:", &mut style.cancel_foreground);

        ui.add_space(ITEM_SPACING);
        ui.horizontal(|ui| {
            ui.add(styled_button("Save", ButtonRole::Save, &draft.button_style));
            ui.add(styled_button("Cancel", ButtonRole::Cancel, &draft.button_style));
        });
    });
}

/// Hex text field plus color picker. Invalid text is flagged and left for the user to fix.
fn color_row(ui: &mut egui::Ui, label: &str, hex: &mut String) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(egui::TextEdit::singleline(hex).desired_width(80.0));

        match HexColor::parse(hex) {
            Some(color) => {
                let mut color = color.to_color32();
                if ui.color_edit_button_srgba(&mut color).changed() {
                    *hex = color32_to_hex(color);
                }
            }
            None => {
                ui.colored_label(COLOR_ERROR, "⚠")
                    .on_hover_text("Use #RRGGBB");
            }
        }
    });
}

/// Miniature of the overlay drawn with the draft settings
fn render_preview(ui: &mut egui::Ui, draft: &Config) {
    ui.label(egui::RichText::new("Preview").strong());
    ui.add_space(ITEM_SPACING / 2.0);

    let palette = OverlayPalette::from_config(draft);
    let pages = CommandPages::new(&draft.command_groups, draft.lines_per_page);
    let font = egui::FontId::proportional(f32::from(draft.font_size));

    egui::Frame::default()
        .fill(palette.background)
        .inner_margin(8.0)
        .corner_radius(4.0)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.spacing_mut().item_spacing.y = LINE_SPACING;

            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new(pages.label())
                        .font(font.clone())
                        .strong()
                        .color(palette.text),
                );
            });
            for command in pages.current() {
                ui.label(
                    egui::RichText::new(command)
                        .font(font.clone())
                        .color(palette.text),
                );
            }
        });
}
