// src/fetch/offset.rs
//! Offset/length paging, as spoken by the "webservice status" listing.
//!
//! Request: `draw` (page counter from 1), `start`, `length`, plus filters.
//! Response: a flat list under `data`, `records` or `aaData`.
//! Done when a page is empty or shorter than `length`; either signal ends it.

use log::{ debug, warn };
use serde_json::Value;

use crate::{
    auth::Session,
    config::options::FetchOptions,
    core::extract::first_match,
    core::net::{ HttpRequest, Transport },
    endpoint::EndpointDescriptor,
    progress::Progress,
};

use super::fetch::{ into_records, pause, request_page, FetchOutcome, StopReason };

fn list_under(v: &Value, key: &str) -> Option<Vec<Value>> {
    v.get(key).and_then(Value::as_array).filter(|a| !a.is_empty()).cloned()
}
fn data_list(v: &Value) -> Option<Vec<Value>> { list_under(v, "data") }
fn records_list(v: &Value) -> Option<Vec<Value>> { list_under(v, "records") }
fn aa_data_list(v: &Value) -> Option<Vec<Value>> { list_under(v, "aaData") }

/// First non-empty list among `data`, `records`, `aaData`; empty otherwise.
pub fn offset_records(body: &Value) -> Vec<Value> {
    first_match(body, &[data_list, records_list, aa_data_list]).unwrap_or_default()
}

pub(super) fn walk<T: Transport + ?Sized>(
    transport: &T,
    session: &Session,
    endpoint: &EndpointDescriptor,
    opts: &FetchOptions,
    progress: &mut dyn Progress,
) -> FetchOutcome {
    let mut out = FetchOutcome::new(endpoint.name());
    let length = opts.page_size.max(1);
    let max_pages = opts.max_pages.max(1);
    let mut start: u64 = 0;
    let mut draw: u32 = 1;

    loop {
        let mut query = pairs![
            "draw" => draw.to_string(),
            "start" => start.to_string(),
            "length" => length.to_string(),
        ];
        query.extend(endpoint.query_filters());
        let req = HttpRequest::get(endpoint.url()).query(query);

        let body = match request_page(transport, session, req, endpoint.name(), draw) {
            Ok(b) => b,
            Err(e) => return out.failed(e),
        };

        let page = offset_records(&body);
        let n = page.len();
        out.pages_fetched += 1;
        progress.page_done(draw, n, None);
        debug!("{}: draw={draw} start={start} -> {n} rows", endpoint.name());

        if n == 0 {
            return out.stopped(StopReason::EmptyPage);
        }
        out.records.extend(into_records(page));
        if n < length as usize {
            return out.stopped(StopReason::ShortPage);
        }
        if out.pages_fetched >= max_pages {
            warn!("{}: stopping at page limit ({max_pages})", endpoint.name());
            return out.stopped(StopReason::PageLimit);
        }

        start += u64::from(length);
        draw += 1;
        pause(opts.delay);
    }
}
