// src/file.rs

use std::{
    collections::HashMap,
    fs::{ self, File },
    io::BufWriter,
    path::{ Path, PathBuf },
};

use log::info;

use crate::config::options::ExportOptions;
use crate::core::sanitize::sanitize_endpoint_filename;
use crate::csv::write_table;
use crate::error::ExportError;
use crate::table::DataSet;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io { path: path.display().to_string(), source }
}

/// Write one table to the file implied by `export.out_path()`. Returns the path written.
pub fn write_export_single(export: &ExportOptions, data: &DataSet) -> Result<PathBuf, ExportError> {
    let path = export.out_path();
    write_file(&path, data, export)?;
    Ok(path)
}

/// Write each named table to `<dir>/<stem>.<ext>` under `export.out_path()`.
/// Stems come from the endpoint names; repeats within one run get ` (N)` suffixes.
pub fn write_export_per_endpoint(
    export: &ExportOptions,
    tables: &[(String, DataSet)],
) -> Result<Vec<PathBuf>, ExportError> {
    let outdir = export.out_path();
    ensure_directory(&outdir)?;

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut written = Vec::with_capacity(tables.len());
    let ext = export.format.ext();

    for (idx, (name, data)) in tables.iter().enumerate() {
        let stem = sanitize_endpoint_filename(name, idx);
        let path = resolve_endpoint_filename(&outdir, &stem, &mut seen, ext);
        write_file(&path, data, export)?;
        written.push(path);
    }

    Ok(written)
}

fn write_file(path: &Path, data: &DataSet, export: &ExportOptions) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    let file = File::create(path).map_err(io_err(path))?;
    write_table(BufWriter::new(file), data, export.include_headers, export.delim())?;
    info!("wrote {} rows to {}", data.len(), path.display());
    Ok(())
}

pub fn ensure_directory(dir: &Path) -> Result<(), ExportError> {
    if dir.exists() && !dir.is_dir() {
        return Err(ExportError::NotADirectory(dir.display().to_string()));
    }
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(io_err(dir))?;
    }
    Ok(())
}

/// `<stem>.<ext>` the first time, `<stem> (N).<ext>` (N from 2) after that.
/// Only names handed out in this run are tracked.
pub fn resolve_endpoint_filename(
    dir: &Path,
    stem: &str,
    seen_names: &mut HashMap<String, usize>,
    ext: &str,
) -> PathBuf {
    let count = seen_names.entry(s!(stem)).or_insert(0);
    let filename = if *count == 0 {
        format!("{stem}.{ext}")
    } else {
        format!("{stem} ({}).{ext}", *count + 1)
    };
    *count += 1;
    dir.join(filename)
}
