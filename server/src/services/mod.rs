//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on request parsing and error mapping.

pub mod analytics;
pub mod persistence;
pub mod sentiment;
pub mod status;
