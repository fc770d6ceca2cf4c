// src/lib.rs

#[macro_use]
pub mod macros;

pub mod auth;
pub mod config;
pub mod core;
pub mod endpoint;
pub mod error;
pub mod fetch;
pub mod log;
pub mod normalize;
pub mod progress;
pub mod reduce;
pub mod runner;

pub mod csv;
pub mod file;
pub mod table;

#[cfg(feature = "cli")]
pub mod cli;

pub use auth::{Credentials, Session, Token};
pub use endpoint::{DateRange, EndpointDescriptor, Pagination};
pub use error::{AuthError, FetchError};
pub use fetch::{FetchOutcome, StopReason};
pub use normalize::{CanonicalRow, ColumnAliases, Record};
pub use reduce::FinalRow;
pub use table::DataSet;
