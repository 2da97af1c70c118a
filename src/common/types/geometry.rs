//! Geometric types for overlay window placement
//!
//! Position and size are persisted separately (`window_position`,
//! `window_size`), so each gets its own newtype to avoid swapping x/y
//! with width/height when converting to and from egui coordinates.

use serde::{Deserialize, Serialize};

/// Top-left corner of the overlay window in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_pos2(self) -> egui::Pos2 {
        egui::pos2(self.x as f32, self.y as f32)
    }

    /// Round an egui screen position to whole pixels
    pub fn from_pos2(pos: egui::Pos2) -> Self {
        Self {
            x: pos.x.round() as i32,
            y: pos.y.round() as i32,
        }
    }
}

/// Overlay window size (width × height)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn to_vec2(self) -> egui::Vec2 {
        egui::vec2(self.width as f32, self.height as f32)
    }

    /// Convert an egui size, rejecting degenerate (zero or negative) sizes.
    /// Some platforms report an empty rect while the window is being mapped.
    pub fn from_vec2(size: egui::Vec2) -> Option<Self> {
        let width = size.x.round();
        let height = size.y.round();
        if width < 1.0 || height < 1.0 {
            return None;
        }
        Some(Self {
            width: width as u32,
            height: height as u32,
        })
    }

    /// Clamp both sides to at least the given minimum
    pub fn at_least(self, min: Dimensions) -> Self {
        Self {
            width: self.width.max(min.width),
            height: self.height.max(min.height),
        }
    }
}
