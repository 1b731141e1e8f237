//! Terminal UI module using ratatui.
//!
//! - `render`: form layout, banner and overlays
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling

pub mod input;
pub mod render;
pub mod styles;
