// src/csv.rs
use csv::{ QuoteStyle, Writer, WriterBuilder };
use std::io::Write;

use crate::error::ExportError;
use crate::table::DataSet;

fn writer<W: Write>(w: W, delim: u8) -> Writer<W> {
    WriterBuilder::new()
        .delimiter(delim)
        .quote_style(QuoteStyle::Necessary)
        .flexible(true)
        .from_writer(w)
}

/// Stream a table to any writer. Headers are written only when present and requested.
pub fn write_table<W: Write>(
    w: W,
    data: &DataSet,
    include_headers: bool,
    delim: u8,
) -> Result<(), ExportError> {
    let mut out = writer(w, delim);
    if include_headers {
        if let Some(h) = &data.headers {
            out.write_record(h)?;
        }
    }
    for row in &data.rows {
        out.write_record(row)?;
    }
    out.flush().map_err(|source| ExportError::Io { path: s!("<writer>"), source })?;
    Ok(())
}

/// Whole table as text (clipboard/stdout).
pub fn to_export_string(data: &DataSet, include_headers: bool, delim: u8) -> Result<String, ExportError> {
    let mut buf: Vec<u8> = Vec::new();
    write_table(&mut buf, data, include_headers, delim)?;

    Ok(match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    })
}
