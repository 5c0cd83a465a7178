//! `tn`: a terminal reader for TabNews.
//!
//! The core is UI independent:
//!
//! - [`api`] - remote listing and article calls behind the [`api::ContentSource`] seam
//! - [`cache`] - in-memory pages and articles keyed by [`cache::PageKey`] / id
//! - [`snapshot`] - the article cache persisted as one JSON file
//! - [`navigation`] - pure reducer from user actions to state and effects
//! - [`browser`] - runs the effects, cache first
//!
//! [`app`] and [`ui`] are the terminal shell on top of it.

pub mod api;
pub mod app;
pub mod browser;
pub mod cache;
pub mod config;
pub mod keybindings;
pub mod navigation;
pub mod snapshot;
pub mod ui;
pub mod util;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_TITLE: &str = "TabNews CLI";

pub const COPYRIGHT: &str = "(c) 2022 Carlos E. Torres";

pub const LOGO: &str = r"
 _
| |_ _ __
| __| '_ \
| |_| | | |
 \__|_| |_|
";

/// Text printed by `--version` and shown at the top of the info screen.
pub fn version_text() -> String {
    format!("{}\n{} {}\n{}", LOGO.trim_matches('\n'), APP_TITLE, VERSION, COPYRIGHT)
}
