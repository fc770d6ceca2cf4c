// src/fetch/single.rs
// Unpaged datasets: one POST, records under `data` (list) or `data.datas`.

use serde_json::Value;

use crate::{
    auth::Session,
    core::extract::{ at, first_match },
    core::net::{ HttpRequest, Transport },
    endpoint::EndpointDescriptor,
    progress::Progress,
};

use super::fetch::{ into_records, request_page, FetchOutcome, StopReason };

fn flat_data(v: &Value) -> Option<Vec<Value>> {
    v.get("data").and_then(Value::as_array).cloned()
}

fn nested_datas(v: &Value) -> Option<Vec<Value>> {
    at(v, &["data", "datas"]).and_then(Value::as_array).cloned()
}

pub(super) fn fetch<T: Transport + ?Sized>(
    transport: &T,
    session: &Session,
    endpoint: &EndpointDescriptor,
    progress: &mut dyn Progress,
) -> FetchOutcome {
    let mut out = FetchOutcome::new(endpoint.name());
    let req = HttpRequest::post(endpoint.url()).form(endpoint.form_filters());

    let body = match request_page(transport, session, req, endpoint.name(), 1) {
        Ok(b) => b,
        Err(e) => return out.failed(e),
    };

    let list = first_match(&body, &[flat_data, nested_datas]).unwrap_or_default();
    let n = list.len();
    progress.page_done(1, n, Some(1));

    out.pages_fetched = 1;
    out.records = into_records(list);
    if n == 0 { out.stopped(StopReason::EmptyPage) } else { out.stopped(StopReason::Exhausted) }
}
