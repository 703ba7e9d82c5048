//! # HMS Core
//!
//! Pure logic for the hospital management client.
//!
//! This crate holds everything that can be computed without the network:
//! - Role permissions and route access
//! - Pagination windows and page markers
//! - The form state and validation engine, field validators and display formatters
//! - The pharmacy dispensing record and the pharmacy queue filters
//!
//! **No I/O**: HTTP calls, session storage and polling belong in `hms-client`.

pub mod constants;
pub mod dispense;
mod error;
pub mod form;
pub mod formatters;
pub mod models;
pub mod pagination;
pub mod permissions;
pub mod queue;
pub mod validation;

pub use error::{CoreError, CoreResult};
pub use permissions::Role;
