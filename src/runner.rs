// src/runner.rs
//! End-to-end workflows shared by the CLI and library callers:
//! session → fetch → normalize/reduce (or flatten) → export.

use std::path::PathBuf;

use log::info;

use crate::{
    auth::{ Credentials, Session, Token },
    config::options::{ AppOptions, ExportOptions, ExportType, FetchOptions },
    core::net::Transport,
    endpoint::{ DateRange, EndpointDescriptor },
    error::{ AuthError, ExportError, FetchError },
    fetch::{ fetch_all, fetch_batch, FetchOutcome, StopReason },
    file::{ write_export_per_endpoint, write_export_single },
    normalize::{ flatten, normalize, ColumnAliases, Record },
    progress::Progress,
    reduce::{ reduce, FinalRow },
    table::DataSet,
};

/// How to obtain a session: log in, or reuse a token from an earlier login.
pub enum Login {
    Password(Credentials),
    Token(Token),
}

pub fn open_session<T: Transport + ?Sized>(
    transport: &T,
    login: Login,
    opts: &AppOptions,
) -> Result<Session, AuthError> {
    match login {
        Login::Password(creds) => Session::login(transport, &creds, &opts.base_url, &opts.auth_url()),
        Login::Token(token) => Ok(Session::from_token(token, &opts.base_url)),
    }
}

/// Result of the status workflow. When `error` is set the fetch stopped early and
/// `rows` cover only the pages received before it.
#[derive(Debug)]
pub struct StatusReport {
    pub records_fetched: usize,
    pub pages_fetched: u32,
    pub stop: StopReason,
    pub error: Option<FetchError>,
    pub rows: Vec<FinalRow>,
}

impl StatusReport {
    pub fn table(&self) -> DataSet {
        DataSet::from(self.rows.as_slice())
    }
}

/// Fetch the webservice-status listing for `range`, then dedup and score it.
pub fn run_status<T: Transport + ?Sized>(
    transport: &T,
    session: &Session,
    opts: &AppOptions,
    range: DateRange,
    kdsatker: Option<&str>,
    aliases: &ColumnAliases,
    progress: Option<&mut dyn Progress>,
) -> StatusReport {
    let mut endpoint = EndpointDescriptor::status_listing(opts.status_url(), range);
    if let Some(k) = kdsatker {
        endpoint = endpoint.with_kdsatker(k);
    }

    let outcome = fetch_all(transport, session, &endpoint, &opts.fetch, progress);
    let canonical = normalize(&outcome.records, aliases);
    let rows = reduce(&canonical);
    info!(
        "status: {} records → {} canonical → {} entities",
        outcome.records.len(),
        canonical.len(),
        rows.len()
    );

    StatusReport {
        records_fetched: outcome.records.len(),
        pages_fetched: outcome.pages_fetched,
        stop: outcome.stop,
        error: outcome.error,
        rows,
    }
}

pub fn export_status(report: &StatusReport, export: &ExportOptions) -> Result<PathBuf, ExportError> {
    write_export_single(export, &report.table())
}

/// Fetch raw datasets endpoint by endpoint. Every attempted endpoint gets an
/// outcome, failed ones included, so callers can export what did arrive.
pub fn run_raw<T: Transport + ?Sized>(
    transport: &T,
    session: &Session,
    endpoints: &[EndpointDescriptor],
    opts: &FetchOptions,
    progress: Option<&mut dyn Progress>,
) -> Vec<FetchOutcome> {
    fetch_batch(transport, session, endpoints, opts, progress)
}

/// `PerEndpoint` writes one file per outcome; `SingleFile` merges every record
/// into one table.
pub fn export_raw(outcomes: &[FetchOutcome], export: &ExportOptions) -> Result<Vec<PathBuf>, ExportError> {
    match export.export_type {
        ExportType::PerEndpoint => {
            let tables: Vec<(String, DataSet)> = outcomes
                .iter()
                .filter(|o| !o.records.is_empty())
                .map(|o| (o.endpoint.clone(), flatten(&o.records)))
                .collect();
            write_export_per_endpoint(export, &tables)
        }
        ExportType::SingleFile => {
            let merged: Vec<Record> = outcomes.iter().flat_map(|o| o.records.iter().cloned()).collect();
            Ok(vec![write_export_single(export, &flatten(&merged))?])
        }
    }
}
