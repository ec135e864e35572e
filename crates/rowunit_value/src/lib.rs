//! # rowunit value
//!
//! Dynamic field values and row payloads for rowunit.
//!
//! This crate is the lowest layer of the workspace. It defines:
//! - [`Value`] - a dynamic field value as read from or written to a store
//! - [`Row`] - an ordered column-to-value payload
//! - the loose-numeric / strict comparison rule used for update diffing
//!
//! A value is *numeric* if it is an integer, a float, or a text string that
//! parses fully as a number. Two numeric values compare by numeric equality
//! (`"88"` equals `88`); everything else compares strictly, with exact type
//! and content.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod row;
mod value;

pub use row::Row;
pub use value::{loosely_equal, numeric_of, Value};
