//! TUI Widgets
//!
//! Custom widgets for the filechat TUI.

mod banners;

pub use banners::render_banners;
