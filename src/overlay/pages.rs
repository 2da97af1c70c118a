//! Pagination of the active command list

use crate::config::CommandGroups;

/// Split `commands` into consecutive chunks of `per_page` labels.
/// The last chunk may be shorter; an empty input yields no pages.
pub fn paginate(commands: &[String], per_page: usize) -> Vec<Vec<String>> {
    commands
        .chunks(per_page.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Pages shown by the overlay plus the index of the visible one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandPages {
    pages: Vec<Vec<String>>,
    current: usize,
}

impl CommandPages {
    pub fn new(groups: &CommandGroups, per_page: usize) -> Self {
        let mut pages = Self::default();
        pages.reorganize(groups, per_page);
        pages
    }

    /// Rebuild pages from the active groups, keeping the current index in range
    pub fn reorganize(&mut self, groups: &CommandGroups, per_page: usize) {
        self.pages = paginate(&groups.active_commands(), per_page);
        self.current = self.current.min(self.pages.len().saturating_sub(1));
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Labels on the visible page (empty when there are no active commands)
    pub fn current(&self) -> &[String] {
        self.pages
            .get(self.current)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Advance one page. Returns false on the last page.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.pages.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page. Returns false on the first page.
    pub fn prev(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// One-based position, e.g. `Page 2/5`
    pub fn label(&self) -> String {
        if self.pages.is_empty() {
            return "Page 0/0".to_string();
        }
        format!("Page {}/{}", self.current + 1, self.pages.len())
    }
}
