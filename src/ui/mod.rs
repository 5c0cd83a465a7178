//! Terminal user interface.
//!
//! - `loop_runner`: terminal setup and the event loop
//! - `input`: key and mouse mapping to navigation actions
//! - `render`: frame layout, delegating to `list`, `reader` and `status`

mod input;
mod list;
mod loop_runner;
mod reader;
mod render;
mod status;

pub use loop_runner::run;
