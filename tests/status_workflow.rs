// tests/status_workflow.rs
mod common;

use std::fs;
use std::path::PathBuf;

use bios_fetch::config::options::{ AppOptions, ExportFormat, ExportType, FetchOptions };
use bios_fetch::runner::{ self, Login };
use bios_fetch::{ ColumnAliases, Credentials, DateRange, EndpointDescriptor, FetchError };
use serde_json::json;

use common::{ nextgen_page, session, Scripted };

fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("bios_fetch_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

fn app() -> AppOptions {
    AppOptions {
        base_url: "http://bios.test".into(),
        fetch: FetchOptions::unthrottled(),
        ..AppOptions::default()
    }
}

#[test]
fn login_then_status_report_to_csv() {
    let t = Scripted::new()
        .json(200, json!({ "status": "MSG20004", "token": "tok-1" }))
        .json(200, json!({ "data": [
            { "kdsatker": "002", "nmsatker": "Satker B", "nmstatus": "Verifikasi Produksi", "updated_at": "2025-02-01 08:00:00" },
            { "kdsatker": "001", "nmsatker": "Satker A", "nmstatus": "In Development",      "updated_at": "2025-01-01 08:00:00" },
            { "kdsatker": "001", "nmsatker": "Satker A", "nmstatus": "Request SK Produksi", "updated_at": "2025-03-01 08:00:00" },
            { "kdsatker": "003", "nmsatker": "nan",      "nmstatus": "In Development" },
        ]}));

    let mut opts = app();
    let session = runner::open_session(&t, Login::Password(Credentials::new("u", "p")), &opts).unwrap();
    assert_eq!(session.token().as_str(), "tok-1");

    let report = runner::run_status(
        &t,
        &session,
        &opts,
        DateRange::new("2025-01-01", "2025-12-31"),
        None,
        &ColumnAliases::default(),
        None,
    );

    assert!(report.error.is_none());
    assert_eq!(report.records_fetched, 4);
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0].entity_key, "001");
    assert_eq!(report.rows[0].status, "Request SK Produksi");
    assert_eq!(report.rows[0].score, 50);

    let reqs = t.requests();
    assert_eq!(reqs[0].url, "http://bios.test/api2/authenticate");
    assert_eq!(reqs[1].url, "http://bios.test/api/pengajuan/data");
    assert_eq!(reqs[1].query_value("to_date"), Some("2025-12-31"));

    let dir = tmp_dir("status");
    opts.export.set_path(dir.join("hasil.csv").to_str().unwrap());
    let path = runner::export_status(&report, &opts.export).unwrap();

    let text = fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "No,Kode Satker,Nama Satker,Status Webservice,Nilai,Capaian");
    assert_eq!(lines[1], "1,001,Satker A,Request SK Produksi,50,10.0");
    assert_eq!(lines[2], "2,002,Satker B,Verifikasi Produksi,60,12.0");
    assert_eq!(lines.len(), 3);
}

#[test]
fn partial_fetch_still_reduces_what_arrived() {
    let t = Scripted::new()
        .json(200, json!({ "data": [
            { "kode_satker": "001", "nama_satker": "A", "status_webservice": "Verifikasi Development" },
            { "kode_satker": "002", "nama_satker": "B", "status_webservice": "Unknown" },
        ]}))
        .text(500, "down");

    let mut opts = app();
    opts.fetch.page_size = 2;
    let report = runner::run_status(
        &t,
        &session(),
        &opts,
        DateRange::new("2025-01-01", "2025-12-31"),
        Some("001"),
        &ColumnAliases::default(),
        None,
    );

    assert!(matches!(report.error, Some(FetchError::Server { status: 500, page: 2, .. })));
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0].score, 20);
    assert_eq!(report.rows[1].score, 0);
    assert_eq!(t.requests()[0].query_value("kdsatker"), Some("001"));
}

#[test]
fn raw_batch_exports_one_file_per_endpoint() {
    let t = Scripted::new()
        .json(200, nextgen_page(1, 3))
        .json(200, nextgen_page(1, 2))
        .json(200, nextgen_page(1, 1));
    let endpoints = vec![
        EndpointDescriptor::nextgen("http://bios.test/api2/ws/nextgen/get/pendidikan/layanan/alumni"),
        EndpointDescriptor::nextgen("http://bios.test/api2/ws/nextgen/get/keuangan/saldo/saldo_operasional"),
        EndpointDescriptor::nextgen("http://bios.test/other/alumni"),
    ];

    let mut opts = app();
    let outcomes = runner::run_raw(&t, &session(), &endpoints, &opts.fetch, None);
    assert!(outcomes.iter().all(|o| o.is_complete()));

    let dir = tmp_dir("raw_per_endpoint");
    opts.export.export_type = ExportType::PerEndpoint;
    opts.export.format = ExportFormat::Tsv;
    opts.export.set_path(dir.to_str().unwrap());

    let written = runner::export_raw(&outcomes, &opts.export).unwrap();
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["alumni.tsv", "saldo_operasional.tsv", "alumni (2).tsv"]);

    let text = fs::read_to_string(&written[0]).unwrap();
    assert_eq!(text.lines().next(), Some("kdsatker\tsaldo"));
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn raw_batch_merges_into_single_file() {
    let t = Scripted::new()
        .json(200, json!({ "data": { "pageCount": 1, "datas": [{ "a": 1 }] } }))
        .json(200, json!({ "data": { "pageCount": 1, "datas": [{ "b": "x" }] } }));
    let endpoints = vec![
        EndpointDescriptor::nextgen("http://bios.test/x/one"),
        EndpointDescriptor::nextgen("http://bios.test/x/two"),
    ];

    let mut opts = app();
    let outcomes = runner::run_raw(&t, &session(), &endpoints, &opts.fetch, None);

    let dir = tmp_dir("raw_single");
    opts.export.set_path(dir.join("merged.csv").to_str().unwrap());
    let written = runner::export_raw(&outcomes, &opts.export).unwrap();

    assert_eq!(written.len(), 1);
    assert_eq!(fs::read_to_string(&written[0]).unwrap(), "a,b\n1,\n,x\n");
}

#[test]
fn reused_token_skips_login() {
    let t = Scripted::new();
    let opts = app();
    let session = runner::open_session(&t, Login::Token(bios_fetch::Token::new("kept")), &opts).unwrap();
    assert_eq!(session.token().as_str(), "kept");
    assert_eq!(t.request_count(), 0);
}
