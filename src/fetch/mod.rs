// src/fetch/mod.rs
mod fetch;
mod offset;
mod page_count;
mod single;

pub use fetch::{fetch_all, fetch_batch, FetchOutcome, StopReason};
pub use offset::offset_records;
pub use page_count::{nextgen_records, page_count};
