//! # Scalable Bloom Test Suite
//!
//! Unified test crate for flows that span more than one workspace crate.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Library + calibration harness together
//!     ├── flows.rs      # Polymorphic use, merge, growth, calibration
//!     └── shared.rs     # Filters behind external synchronisation
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bloom-tests
//! cargo test -p bloom-tests integration::shared::
//! ```

pub mod integration;
