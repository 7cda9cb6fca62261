//! Report writers.
//!
//! - `json`: persist a snapshot / read one back (best effort).
//! - `html`: diff a snapshot against a previous one and render a table.
//! - `compare`: baseline vs candidate comparison used by `benchkit-report`.

pub mod compare;
pub mod html;
pub mod json;

pub use html::{DeltaPolarity, DiffRow, RowClass};
