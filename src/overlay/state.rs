//! Application state shared between the overlay window and the tray

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use tracing::{debug, error, info, warn};

use crate::common::constants::config::GEOMETRY_SAVE_DELAY_MS;
use crate::common::types::{Dimensions, Position};
use crate::config::{Config, HotkeyBinding};
use crate::input::{HotkeyRegistry, PageCommand};
use crate::overlay::pages::CommandPages;

use super::StatusMessage;

pub struct SharedState {
    pub config: Config,
    pub config_path: PathBuf,
    pub pages: CommandPages,
    pub hotkeys: HotkeyRegistry,
    pub status_message: Option<StatusMessage>,
    pub show_settings: bool,
    pub should_quit: bool,

    /// Set when the window moved or resized and the new geometry is not yet on disk
    geometry_dirty_since: Option<Instant>,
}

impl SharedState {
    pub fn new(config: Config, config_path: PathBuf, hotkeys: HotkeyRegistry) -> Self {
        let pages = CommandPages::new(&config.command_groups, config.lines_per_page);
        let mut state = Self {
            config,
            config_path,
            pages,
            hotkeys,
            status_message: None,
            show_settings: false,
            should_quit: false,
            geometry_dirty_since: None,
        };
        state.bind_hotkeys();
        state
    }

    fn desired_bindings(config: &Config) -> [(PageCommand, HotkeyBinding); 2] {
        [
            (PageCommand::PreviousPage, config.prev_key.clone()),
            (PageCommand::NextPage, config.next_key.clone()),
        ]
    }

    fn bind_hotkeys(&mut self) {
        match self
            .hotkeys
            .bind_all(&Self::desired_bindings(&self.config))
        {
            Ok(()) => info!(
                backend = self.hotkeys.backend_name(),
                prev = %self.config.prev_key.display_name(),
                next = %self.config.next_key.display_name(),
                "Page hotkeys bound"
            ),
            Err(e) => {
                warn!(error = %e, "Failed to bind page hotkeys");
                self.status_message = Some(StatusMessage::warning(format!(
                    "Hotkeys unavailable: {e}"
                )));
            }
        }
    }

    /// Release the global grabs so the settings window can receive the keys
    pub fn suspend_hotkeys(&mut self) {
        debug!("Suspending page hotkeys");
        self.hotkeys.clear();
    }

    pub fn resume_hotkeys(&mut self) {
        debug!("Resuming page hotkeys");
        self.bind_hotkeys();
    }

    /// Apply a page command. The status line is dismissed once the user pages.
    pub fn handle_command(&mut self, command: PageCommand) -> bool {
        let moved = match command {
            PageCommand::PreviousPage => self.prev_page(),
            PageCommand::NextPage => self.next_page(),
        };
        if moved {
            self.status_message = None;
        }
        moved
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.pages.next();
        debug!(moved, page = %self.pages.label(), "Next page");
        moved
    }

    pub fn prev_page(&mut self) -> bool {
        let moved = self.pages.prev();
        debug!(moved, page = %self.pages.label(), "Previous page");
        moved
    }

    pub fn save_config(&mut self) -> Result<()> {
        self.config.save_to(&self.config_path)?;
        self.geometry_dirty_since = None;
        Ok(())
    }

    /// Replace the configuration with the one edited in the settings dialog.
    ///
    /// The new config is written to disk first. Only once that succeeds does
    /// it become live: pages are rebuilt from the active groups and the page
    /// hotkeys are rebound. A config that binds both directions to the same
    /// key, or that cannot be saved, is rejected and nothing changes.
    pub fn apply_settings(&mut self, mut new_config: Config) -> Result<()> {
        if new_config.prev_key == new_config.next_key {
            bail!(
                "Previous and next page cannot both use {}",
                new_config.prev_key.display_name()
            );
        }

        new_config.sanitize();
        // Geometry is owned by the live window, not the dialog draft
        new_config.window_position = self.config.window_position;
        new_config.window_size = self.config.window_size;

        if let Err(e) = new_config.save_to(&self.config_path) {
            error!(error = ?e, "Failed to save config, settings not applied");
            return Err(e.context("Settings were not saved"));
        }

        self.config = new_config;
        self.geometry_dirty_since = None;
        self.status_message = None;

        self.pages
            .reorganize(&self.config.command_groups, self.config.lines_per_page);
        self.bind_hotkeys();

        if self.status_message.is_none() {
            self.status_message = Some(StatusMessage::success("Settings saved"));
        }
        info!(
            pages = self.pages.page_count(),
            lines_per_page = self.config.lines_per_page,
            "Settings applied"
        );
        Ok(())
    }

    /// Record the current window geometry. Returns true if it differs from the config.
    pub fn track_geometry(&mut self, position: Position, size: Dimensions, now: Instant) -> bool {
        if self.config.window_position == position && self.config.window_size == size {
            return false;
        }
        self.config.window_position = position;
        self.config.window_size = size;
        self.geometry_dirty_since = Some(now);
        true
    }

    /// Write tracked geometry once it has been stable for the save delay
    pub fn flush_geometry(&mut self, now: Instant) {
        let Some(since) = self.geometry_dirty_since else {
            return;
        };
        if now.duration_since(since) < Duration::from_millis(GEOMETRY_SAVE_DELAY_MS) {
            return;
        }
        match self.save_config() {
            Ok(()) => debug!(
                x = self.config.window_position.x,
                y = self.config.window_position.y,
                width = self.config.window_size.width,
                height = self.config.window_size.height,
                "Saved window geometry"
            ),
            Err(e) => {
                error!(error = ?e, "Failed to save window geometry");
                self.status_message = Some(StatusMessage::error(format!(
                    "Window position not saved: {e}"
                )));
                self.geometry_dirty_since = None;
            }
        }
    }

    pub fn geometry_pending(&self) -> bool {
        self.geometry_dirty_since.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::DisabledBackend;

    fn state_in(dir: &tempfile::TempDir) -> SharedState {
        SharedState::new(
            Config::default(),
            dir.path().join("config.json"),
            HotkeyRegistry::new(Box::new(DisabledBackend::new())),
        )
    }

    #[test]
    fn test_new_state_binds_default_hotkeys() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);

        assert_eq!(
            state.hotkeys.binding(PageCommand::PreviousPage),
            Some(&"ctrl+left".parse().unwrap())
        );
        assert_eq!(state.pages.label(), "Page 1/8");
        assert!(state.status_message.is_none());
    }

    #[test]
    fn test_suspend_and_resume_hotkeys() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);

        state.suspend_hotkeys();
        assert_eq!(state.hotkeys.binding(PageCommand::NextPage), None);

        state.resume_hotkeys();
        assert_eq!(
            state.hotkeys.binding(PageCommand::NextPage),
            Some(&"ctrl+right".parse().unwrap())
        );
    }

    #[test]
    fn test_commands_move_pages() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);

        assert!(!state.handle_command(PageCommand::PreviousPage));
        assert!(state.handle_command(PageCommand::NextPage));
        assert_eq!(state.pages.current_index(), 1);
        assert!(state.handle_command(PageCommand::PreviousPage));
        assert_eq!(state.pages.current_index(), 0);
    }

    #[test]
    fn test_apply_settings_persists_and_reorganizes() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);
        while state.next_page() {}

        let mut draft = state.config.clone();
        draft.lines_per_page = 10;
        draft.command_groups.set_active("Drawing", false).unwrap();
        state.apply_settings(draft).unwrap();

        let remaining = state.config.command_groups.active_commands().len();
        assert_eq!(state.pages.page_count(), remaining.div_ceil(10));
        assert_eq!(state.pages.current_index(), state.pages.page_count() - 1);

        let reloaded = Config::load_from(&state.config_path);
        assert_eq!(reloaded.lines_per_page, 10);
        assert!(!reloaded.command_groups.get("Drawing").unwrap().active);
        assert_eq!(
            state.status_message,
            Some(StatusMessage::success("Settings saved"))
        );
    }

    #[test]
    fn test_apply_settings_rebinds_hotkeys() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);

        let mut draft = state.config.clone();
        draft.next_key = "alt+pagedown".parse().unwrap();
        state.apply_settings(draft).unwrap();

        assert_eq!(
            state.hotkeys.binding(PageCommand::NextPage),
            Some(&"alt+pagedown".parse().unwrap())
        );
    }

    #[test]
    fn test_apply_settings_rejects_identical_hotkeys() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);

        let mut draft = state.config.clone();
        draft.next_key = draft.prev_key.clone();
        draft.font_size = 18;

        assert!(state.apply_settings(draft).is_err());
        assert_eq!(state.config.font_size, Config::default().font_size);
        assert!(!state.config_path.exists());
    }

    #[test]
    fn test_apply_settings_unwritable_path_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be written as a file
        let mut state = SharedState::new(
            Config::default(),
            dir.path().to_path_buf(),
            HotkeyRegistry::new(Box::new(DisabledBackend::new())),
        );
        let page_count = state.pages.page_count();

        let mut draft = state.config.clone();
        draft.font_size = 18;
        draft.lines_per_page = 10;
        draft.next_key = "alt+pagedown".parse().unwrap();

        assert!(state.apply_settings(draft).is_err());
        assert_eq!(state.config, Config::default());
        assert_eq!(state.pages.page_count(), page_count);
        assert_eq!(
            state.hotkeys.binding(PageCommand::NextPage),
            Some(&"ctrl+right".parse().unwrap())
        );
        assert!(state.status_message.is_none());
    }

    #[test]
    fn test_geometry_save_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = SharedState::new(
            Config::default(),
            dir.path().to_path_buf(),
            HotkeyRegistry::new(Box::new(DisabledBackend::new())),
        );
        let start = Instant::now();

        state.track_geometry(Position::new(1, 2), Dimensions::new(300, 200), start);
        state.flush_geometry(start + Duration::from_millis(GEOMETRY_SAVE_DELAY_MS));

        assert!(!state.geometry_pending());
        assert!(
            state
                .status_message
                .as_ref()
                .is_some_and(|m| m.text.starts_with("Window position not saved"))
        );
    }

    #[test]
    fn test_apply_settings_keeps_live_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);
        state.track_geometry(Position::new(5, 6), Dimensions::new(400, 500), Instant::now());

        let mut draft = state.config.clone();
        draft.window_position = Position::new(0, 0);
        state.apply_settings(draft).unwrap();

        assert_eq!(state.config.window_position, Position::new(5, 6));
        assert!(!state.geometry_pending());
    }

    #[test]
    fn test_geometry_saved_after_delay() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);
        let start = Instant::now();

        assert!(state.track_geometry(Position::new(40, 50), Dimensions::new(360, 310), start));
        assert!(!state.track_geometry(Position::new(40, 50), Dimensions::new(360, 310), start));

        state.flush_geometry(start + Duration::from_millis(10));
        assert!(!state.config_path.exists());

        state.flush_geometry(start + Duration::from_millis(GEOMETRY_SAVE_DELAY_MS));
        assert!(!state.geometry_pending());

        let reloaded = Config::load_from(&state.config_path);
        assert_eq!(reloaded.window_position, Position::new(40, 50));
        assert_eq!(reloaded.window_size, Dimensions::new(360, 310));
    }
}
