// tests/common/mod.rs
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use bios_fetch::core::net::{ HttpRequest, HttpResponse, Transport };
use bios_fetch::error::TransportError;
use bios_fetch::{ Session, Token };
use serde_json::{ json, Value };

/// Replays canned responses in order and records every request it sees.
/// Once the script runs dry, every further request gets a 599.
#[derive(Default)]
pub struct Scripted {
    responses: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    seen: RefCell<Vec<HttpRequest>>,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(self, status: u16, body: Value) -> Self {
        self.responses.borrow_mut().push_back(Ok(HttpResponse::new(status, body.to_string())));
        self
    }

    pub fn text(self, status: u16, body: &str) -> Self {
        self.responses.borrow_mut().push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn unreachable(self, message: &str) -> Self {
        self.responses.borrow_mut().push_back(Err(TransportError(message.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.seen.borrow().len()
    }
}

impl Transport for Scripted {
    fn send(&self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.borrow_mut().push(req.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(599, "script exhausted")))
    }
}

pub fn session() -> Session {
    Session::from_token(Token::new("test-token"), "http://bios.test")
}

/// `n` status-listing records; keys start at `first`.
pub fn status_records(first: usize, n: usize) -> Vec<Value> {
    (first..first + n)
        .map(|i| {
            json!({
                "kdsatker": format!("{i:06}"),
                "nmsatker": format!("Satker {i}"),
                "nmstatus": "In Development",
            })
        })
        .collect()
}

/// A nextgen page body with `n` rows.
pub fn nextgen_page(page_count: u64, n: usize) -> Value {
    let datas: Vec<Value> = (0..n).map(|i| json!({ "kdsatker": format!("{i:06}"), "saldo": i })).collect();
    json!({ "status": "MSG20004", "data": { "pageCount": page_count, "datas": datas } })
}
