//! UI module for the dungeon TUI

pub mod layout;
pub mod render;
pub mod theme;
pub mod widgets;
