// src/fetch/fetch.rs
use std::{ thread, time::Duration };

use log::{ debug, info, warn };
use serde_json::Value;

use crate::{
    auth::Session,
    config::consts::BODY_SNIPPET_CHARS,
    config::options::FetchOptions,
    core::net::{ HttpRequest, Transport },
    core::sanitize::snippet,
    endpoint::{ EndpointDescriptor, Pagination },
    error::FetchError,
    normalize::Record,
    progress::{ NullProgress, Progress },
};

use super::{ offset, page_count, single };

/// Why a walk ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Every declared page was read (page-count), or the single request returned.
    Exhausted,
    /// A page came back with no records.
    EmptyPage,
    /// A page came back shorter than requested (offset).
    ShortPage,
    /// `max_pages` reached; whatever was collected is returned.
    PageLimit,
    /// See `FetchOutcome::error`.
    Failed,
}

/// Records collected from one endpoint plus how the walk ended.
/// On failure `records` still holds every page received before the error.
#[derive(Debug)]
pub struct FetchOutcome {
    pub endpoint: String,
    pub records: Vec<Record>,
    pub pages_fetched: u32,
    pub stop: StopReason,
    pub error: Option<FetchError>,
}

impl FetchOutcome {
    pub(super) fn new(endpoint: &str) -> Self {
        Self {
            endpoint: s!(endpoint),
            records: Vec::new(),
            pages_fetched: 0,
            stop: StopReason::Exhausted,
            error: None,
        }
    }

    pub(super) fn stopped(mut self, stop: StopReason) -> Self {
        self.stop = stop;
        self
    }

    pub(super) fn failed(mut self, error: FetchError) -> Self {
        warn!("{error} ({} records kept)", self.records.len());
        self.stop = StopReason::Failed;
        self.error = Some(error);
        self
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// All-or-nothing view: drops partial records when the walk failed.
    pub fn into_result(self) -> Result<Vec<Record>, FetchError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.records),
        }
    }
}

/// Walk every page of `endpoint` sequentially.
pub fn fetch_all<T: Transport + ?Sized>(
    transport: &T,
    session: &Session,
    endpoint: &EndpointDescriptor,
    opts: &FetchOptions,
    progress: Option<&mut dyn Progress>,
) -> FetchOutcome {
    let mut null = NullProgress;
    let progress: &mut dyn Progress = match progress {
        Some(p) => p,
        None => &mut null,
    };
    fetch_one(transport, session, endpoint, opts, progress)
}

/// Fetch several endpoints one after another. A failing endpoint does not stop
/// the batch, except a 401: every later request would fail the same way.
pub fn fetch_batch<T: Transport + ?Sized>(
    transport: &T,
    session: &Session,
    endpoints: &[EndpointDescriptor],
    opts: &FetchOptions,
    progress: Option<&mut dyn Progress>,
) -> Vec<FetchOutcome> {
    let mut null = NullProgress;
    let progress: &mut dyn Progress = match progress {
        Some(p) => p,
        None => &mut null,
    };

    let mut outcomes = Vec::with_capacity(endpoints.len());
    for (i, endpoint) in endpoints.iter().enumerate() {
        if i > 0 {
            pause(opts.delay);
        }
        let outcome = fetch_one(transport, session, endpoint, opts, &mut *progress);
        let reauth = outcome.error.as_ref().is_some_and(FetchError::requires_reauth);
        outcomes.push(outcome);
        if reauth {
            warn!("token rejected; skipping {} remaining endpoint(s)", endpoints.len() - i - 1);
            break;
        }
    }
    outcomes
}

fn fetch_one<T: Transport + ?Sized>(
    transport: &T,
    session: &Session,
    endpoint: &EndpointDescriptor,
    opts: &FetchOptions,
    progress: &mut dyn Progress,
) -> FetchOutcome {
    info!("{}: fetching ({:?})", endpoint.name(), endpoint.pagination());
    progress.begin(endpoint.name());

    let outcome = match endpoint.pagination() {
        Pagination::Offset =>
            offset::walk(transport, session, endpoint, opts, &mut *progress),
        Pagination::PageCount { index_base } =>
            page_count::walk(transport, session, endpoint, index_base, opts, &mut *progress),
        Pagination::Single =>
            single::fetch(transport, session, endpoint, &mut *progress),
    };

    info!(
        "{}: {} records from {} page(s), stop={:?}",
        outcome.endpoint, outcome.records.len(), outcome.pages_fetched, outcome.stop
    );
    if let Some(e) = &outcome.error {
        progress.log(&e.to_string());
    }
    progress.finish(outcome.records.len());
    outcome
}

/// Send one page request with the session's headers and decode the JSON body.
pub(super) fn request_page<T: Transport + ?Sized>(
    transport: &T,
    session: &Session,
    req: HttpRequest,
    endpoint: &str,
    page: u32,
) -> Result<Value, FetchError> {
    let req = req.headers(session.headers());
    let resp = transport.send(&req).map_err(|e| FetchError::Transport {
        endpoint: s!(endpoint),
        page,
        message: e.to_string(),
    })?;

    match resp.status {
        200 => {}
        401 => return Err(FetchError::Unauthorized { endpoint: s!(endpoint), page }),
        status => {
            return Err(FetchError::Server {
                endpoint: s!(endpoint),
                page,
                status,
                body: snippet(&resp.body, BODY_SNIPPET_CHARS),
            })
        }
    }

    let body = serde_json::from_str(&resp.body).map_err(|e| FetchError::MalformedResponse {
        endpoint: s!(endpoint),
        page,
        message: e.to_string(),
    })?;
    debug!("{endpoint}: page {page} ok ({} bytes)", resp.body.len());
    Ok(body)
}

/// Keep JSON objects, drop anything else a list might contain.
pub(super) fn into_records(values: Vec<Value>) -> Vec<Record> {
    values
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            other => {
                debug!("skipping non-object record: {other}");
                None
            }
        })
        .collect()
}

pub(super) fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
