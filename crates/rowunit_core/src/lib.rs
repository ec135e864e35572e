//! # rowunit core
//!
//! Unit-of-work transaction engine over entity mappers.
//!
//! This crate provides:
//! - The [`Mapper`] contract and a ready-made [`TableMapper`] driver
//! - A change-set calculator with numeric-vs-strict diff semantics
//! - An entity arena with stable [`EntityKey`] handles
//! - A work registry holding one pending operation per entity
//! - A transaction coordinator over every connection a batch touches
//! - The [`UnitOfWork`] orchestrator and a closure-based
//!   [`TransactionScope`]
//!
//! ## Atomicity
//!
//! A batch commits on every connection or rolls back on every connection.
//! This is fail-fast coordination, not distributed two-phase commit: if one
//! connection commits and a later one fails to commit, the system is left
//! partially committed. Callers that need cross-store atomicity must keep
//! the batch on a single physical connection.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod changeset;
mod config;
mod entity;
mod error;
pub mod mapper;
mod query;
mod registry;
mod scope;
pub mod transaction;
mod unit_of_work;

pub use config::WorkConfig;
pub use entity::{Entity, EntityArena, EntityFactory, EntityKey, Record, RecordFactory};
pub use error::{CoreError, CoreResult};
pub use mapper::{ColumnMap, Mapper, MapperLocator, TableMapper};
pub use query::{Select, Values};
pub use registry::{OpKind, PendingOp, WorkRegistry};
pub use scope::TransactionScope;
pub use unit_of_work::{Failure, InsertedEntity, UnitOfWork};
