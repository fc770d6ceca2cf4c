// src/core/mod.rs

pub mod extract;
pub mod net;
pub mod sanitize;

pub use net::{HttpClient, HttpRequest, HttpResponse, Transport};
