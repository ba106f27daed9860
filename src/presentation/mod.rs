//! Presentation layer handling terminal UI and user input.
//!
//! This module renders the login, application, and dashboard screens and
//! their modals using ratatui, and maps keyboard input onto app actions.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
