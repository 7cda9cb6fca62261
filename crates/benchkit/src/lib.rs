//! Top-level facade crate for benchkit.
//!
//! Re-exports the data model and the SDK so users can depend on a single crate.

pub mod core {
    pub use benchkit_core::*;
}

pub mod sdk {
    pub use benchkit_sdk::*;
}
