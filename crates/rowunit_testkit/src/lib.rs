//! # RowUnit Testkit
//!
//! Test utilities for RowUnit.
//!
//! This crate provides:
//! - Seeded store fixtures with wired-up mappers
//! - Property-based test generators using proptest
//! - Cross-crate integration test helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rowunit_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_people() {
//!     let fixture = PeopleFixture::seeded();
//!     let mut work = fixture.unit_of_work();
//!     // ... batch operations
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
