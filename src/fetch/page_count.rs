// src/fetch/page_count.rs
//! Page-number paging, as spoken by the nextgen financial datasets.
//!
//! Request: `POST <url>?page=N` with a form body of filters.
//! Response: `{"data": {"pageCount": P, "datas": [...], "total": T, "size": S}}`.
//! The first page fixes the page count; without one the walk is refused.

use log::{ debug, info, warn };
use serde_json::Value;

use crate::{
    auth::Session,
    config::options::FetchOptions,
    core::extract::{ at, count_at, first_named, Named },
    core::net::{ HttpRequest, Transport },
    endpoint::EndpointDescriptor,
    error::FetchError,
    progress::Progress,
};

use super::fetch::{ into_records, pause, request_page, FetchOutcome, StopReason };

const PAGE_COUNT_STRATEGIES: &[Named<u64>] = &[
    ("pageCount", declared_page_count),
    ("total/size", derived_page_count),
];

fn declared_page_count(v: &Value) -> Option<u64> {
    count_at(v, &["data", "pageCount"]).filter(|n| *n > 0)
}

fn derived_page_count(v: &Value) -> Option<u64> {
    let total = count_at(v, &["data", "total"])?;
    let size = count_at(v, &["data", "size"]).filter(|s| *s > 0)?;
    Some(total.div_ceil(size)).filter(|n| *n > 0)
}

/// Total pages announced by a first-page body, if any usable signal exists.
pub fn page_count(body: &Value) -> Option<u32> {
    first_named(body, PAGE_COUNT_STRATEGIES).map(|(via, n)| {
        debug!("page count {n} via {via}");
        u32::try_from(n).unwrap_or(u32::MAX)
    })
}

/// Records under `data.datas`.
pub fn nextgen_records(body: &Value) -> Vec<Value> {
    at(body, &["data", "datas"])
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

pub(super) fn walk<T: Transport + ?Sized>(
    transport: &T,
    session: &Session,
    endpoint: &EndpointDescriptor,
    index_base: u32,
    opts: &FetchOptions,
    progress: &mut dyn Progress,
) -> FetchOutcome {
    let mut out = FetchOutcome::new(endpoint.name());
    let max_pages = opts.max_pages.max(1);
    let form = endpoint.form_filters();
    let mut total_pages: Option<u32> = None;

    loop {
        let page_no = index_base + out.pages_fetched;
        let req = HttpRequest::post(endpoint.url())
            .query(pairs!["page" => page_no.to_string()])
            .form(form.clone());

        let body = match request_page(transport, session, req, endpoint.name(), page_no) {
            Ok(b) => b,
            Err(e) => return out.failed(e),
        };

        let total = match total_pages {
            Some(t) => t,
            None => match page_count(&body) {
                Some(t) => {
                    info!("{}: {t} page(s) declared", endpoint.name());
                    total_pages = Some(t);
                    t
                }
                None => {
                    // The page was answered, but its records are discarded.
                    out.pages_fetched += 1;
                    progress.page_done(page_no, nextgen_records(&body).len(), None);
                    return out.failed(FetchError::ExtentUnknown { endpoint: s!(endpoint.name()) });
                }
            },
        };

        let page = nextgen_records(&body);
        let n = page.len();
        out.pages_fetched += 1;
        progress.page_done(page_no, n, Some(total));
        debug!("{}: page {page_no}/{total} -> {n} rows", endpoint.name());

        if n == 0 {
            return out.stopped(StopReason::EmptyPage);
        }
        out.records.extend(into_records(page));
        if out.pages_fetched >= total {
            return out.stopped(StopReason::Exhausted);
        }
        if out.pages_fetched >= max_pages {
            warn!("{}: stopping at page limit ({max_pages} of {total})", endpoint.name());
            return out.stopped(StopReason::PageLimit);
        }

        pause(opts.delay);
    }
}
