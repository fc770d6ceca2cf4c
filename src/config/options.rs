// src/config/options.rs
use std::ffi::OsString;
use std::path::{ Path, PathBuf };
use std::time::Duration;
use super::consts::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppOptions {
    pub base_url: String,
    pub fetch: FetchOptions,
    pub export: ExportOptions,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            base_url: s!(BASE_URL),
            fetch: FetchOptions::default(),
            export: ExportOptions::default(),
        }
    }
}

impl AppOptions {
    pub fn auth_url(&self) -> String {
        join!(self.base_url.trim_end_matches('/'), AUTH_PATH)
    }

    pub fn status_url(&self) -> String {
        join!(self.base_url.trim_end_matches('/'), STATUS_DATA_PATH)
    }

    /// `dataset` is the path below the nextgen prefix, e.g. `keuangan/saldo/saldo_operasional`.
    pub fn nextgen_url(&self, dataset: &str) -> String {
        join!(self.base_url.trim_end_matches('/'), NEXTGEN_PREFIX, dataset.trim_start_matches('/'))
    }
}

/// Knobs for one paginated walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    /// Rows requested per page (offset convention only).
    pub page_size: u32,
    /// Hard ceiling on requests per endpoint; reaching it is not an error.
    pub max_pages: u32,
    /// Pause between consecutive requests. Zero disables sleeping.
    pub delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            max_pages: MAX_PAGES,
            delay: Duration::from_millis(REQUEST_PAUSE_MS),
        }
    }
}

impl FetchOptions {
    /// No pauses; for tests and local mirrors.
    pub fn unthrottled() -> Self {
        Self { delay: Duration::ZERO, ..Self::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportType {
    SingleFile,
    PerEndpoint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self { ExportFormat::Csv => "csv", ExportFormat::Tsv => "tsv" }
    }
    pub fn delim(&self) -> u8 {
        match self { ExportFormat::Csv => b',', ExportFormat::Tsv => b'\t' }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub export_type: ExportType,
    out_path: OutputPath,
    pub include_headers: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            export_type: ExportType::SingleFile,
            out_path: OutputPath::default(),
            include_headers: true,
        }
    }
}

impl ExportOptions {
    /// File path for `SingleFile`, directory for `PerEndpoint`.
    pub fn out_path(&self) -> PathBuf {
        let mut path = self.out_path.dir.clone();

        match self.export_type {
            ExportType::SingleFile => {
                match &self.out_path.file_name {
                    Some(name) => path.push(name),
                    None => {
                        let stem = self.out_path.file_stem.to_string_lossy().into_owned();
                        path.push(join!(stem, ".", self.format.ext()));
                    }
                }
            },
            ExportType::PerEndpoint => { /* directory only */ },
        }
        path
    }

    /// Parse user text into dir + file. An explicit extension typed by the user is kept.
    pub fn set_path(&mut self, text: &str) {
        let s = text.trim();

        match self.export_type {
            ExportType::SingleFile => {
                let p = Path::new(s);
                if let Some(parent) = p.parent() {
                    self.out_path.dir = parent.to_path_buf();
                }
                if let Some(stem) = p.file_stem() {
                    self.out_path.file_stem = stem.to_os_string();
                }
                self.out_path.file_name = match p.extension() {
                    Some(_) => p.file_name().map(|n| n.to_os_string()),
                    None => None,
                };
            }
            ExportType::PerEndpoint => {
                self.out_path.dir = PathBuf::from(s);
            }
        }
    }

    pub fn delim(&self) -> u8 {
        self.format.delim()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct OutputPath {
    dir: PathBuf,
    file_stem: OsString,         // without extension
    file_name: Option<OsString>, // user-typed name incl. extension
}

impl Default for OutputPath {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUT_DIR),
            file_stem: OsString::from(DEFAULT_STATUS_FILE),
            file_name: None,
        }
    }
}
