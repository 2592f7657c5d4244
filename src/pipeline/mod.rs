//! Pipeline entry points for relay runs.
//!
//! - `run_once`: fetch, extract, format and emit one menu
//! - `render_menu`: the offline half (date, format, split) shared with previews

pub mod render;
pub mod run;

pub use render::{RenderedMenu, render_menu};
pub use run::{RunDeps, RunReport, RunStatus, run_once};
