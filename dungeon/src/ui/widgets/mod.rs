//! Custom widgets for the dungeon TUI

pub mod character_panel;
pub mod input;
pub mod narrative;

pub use character_panel::CharacterPanelWidget;
pub use input::InputWidget;
pub use narrative::NarrativeWidget;
