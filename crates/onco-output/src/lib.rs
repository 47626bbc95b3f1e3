//! Output tables for oncomatch results.
//!
//! Results are rendered into an [`OutputTable`] once the whole batch is
//! processed, then written as CSV or JSON.

pub mod error;
pub mod render;
pub mod table;

pub use error::OutputError;
pub use render::{render_collapsed, render_protocols, render_substances};
pub use table::{OutputFormat, OutputTable};
