//! Shared status-tracking model for the `server` and `cli` crates.
//!
//! This crate owns the record types that travel over the REST surface, the
//! step workflow operations, and the query predicates. The server applies
//! them to its in-memory book; the CLI's mock source applies the same
//! functions to the bundled seed data, so both agree on results.

pub mod analytics;
pub mod embedding;
pub mod model;
pub mod query;
pub mod request;
pub mod seed;
pub mod steps;
pub mod timestamp;

pub use model::{Document, Status, StatusHistoryItem, Step, StepOrder, StepPatch, StepStatus, SubTransaction};
pub use query::{ListFilter, Pagination, QueryError, SearchCriteria};
pub use request::{NewStatus, StatusUpdate};
