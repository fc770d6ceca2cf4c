// src/core/net.rs

// Blocking HTTP behind a small trait. Everything above this layer talks
// `HttpRequest`/`HttpResponse` so pagination can run against scripted servers.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::consts::DATA_TIMEOUT_SECS;
use crate::error::TransportError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Body,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: s!(url),
            query: Vec::new(),
            headers: Vec::new(),
            body: Body::Empty,
            timeout: Duration::from_secs(DATA_TIMEOUT_SECS),
        }
    }

    pub fn get(url: &str) -> Self { Self::new(Method::Get, url) }
    pub fn post(url: &str) -> Self { Self::new(Method::Post, url) }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn headers(mut self, pairs: &[(String, String)]) -> Self {
        self.headers.extend_from_slice(pairs);
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = Body::Form(pairs);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Query value by name (first match).
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }
}

/// One request in, one response (any status) out. Only failures that never
/// produced a status line are errors.
pub trait Transport {
    fn send(&self, req: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(req)
    }
}

/// reqwest-backed transport.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpClient {
    fn send(&self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match req.method {
            Method::Get => self.client.get(&req.url),
            Method::Post => self.client.post(&req.url),
        };
        builder = builder.timeout(req.timeout);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &req.body {
            Body::Empty => builder,
            Body::Json(v) => builder.json(v),
            Body::Form(pairs) => builder.form(pairs),
        };

        debug!("{:?} {} ({} query params)", req.method, req.url, req.query.len());
        let resp = builder.send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        Ok(HttpResponse { status, body })
    }
}
