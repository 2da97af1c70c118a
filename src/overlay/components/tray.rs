use eframe::egui;
use std::sync::{Arc, Mutex};

use crate::common::constants::overlay::{APP_ID, WINDOW_TITLE};
use crate::overlay::state::SharedState;

/// System tray icon with Settings and Quit entries
pub struct AppTray {
    pub state: Arc<Mutex<SharedState>>,
    pub ctx: egui::Context,
}

impl AppTray {
    fn with_state(&self, f: impl FnOnce(&mut SharedState)) {
        match self.state.lock() {
            Ok(mut state) => f(&mut state),
            Err(e) => tracing::error!(error = ?e, "Failed to lock shared state from tray"),
        }
        self.ctx.request_repaint();
    }
}

impl ksni::Tray for AppTray {
    fn id(&self) -> String {
        APP_ID.into()
    }

    fn icon_name(&self) -> String {
        // Freedesktop theme icon; no bundled artwork
        "accessories-text-editor".into()
    }

    fn title(&self) -> String {
        WINDOW_TITLE.into()
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        let page = self
            .state
            .lock()
            .map(|state| state.pages.label())
            .unwrap_or_default();
        ksni::ToolTip {
            title: WINDOW_TITLE.into(),
            description: page,
            ..Default::default()
        }
    }

    fn menu(&self) -> Vec<ksni::MenuItem<Self>> {
        use ksni::menu::*;

        vec![
            StandardItem {
                label: "Settings…".into(),
                activate: Box::new(|this: &mut AppTray| {
                    this.with_state(|state| state.show_settings = true);
                }),
                ..Default::default()
            }
            .into(),
            MenuItem::Separator,
            StandardItem {
                label: "Quit".into(),
                activate: Box::new(|this: &mut AppTray| {
                    this.with_state(|state| state.should_quit = true);
                }),
                ..Default::default()
            }
            .into(),
        ]
    }
}
