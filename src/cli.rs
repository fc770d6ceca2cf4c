// src/cli.rs
use std::fs;
use std::path::{ Path, PathBuf };
use std::time::Duration;

use clap::{ Parser, Subcommand, ValueEnum };
use color_eyre::eyre::{ bail, eyre, Result, WrapErr };
use log::LevelFilter;

use crate::{
    auth::{ Credentials, Token },
    config::consts::*,
    config::options::{ AppOptions, ExportFormat, ExportType },
    core::net::HttpClient,
    csv::to_export_string,
    endpoint::{ DateRange, EndpointDescriptor, Pagination },
    normalize::ColumnAliases,
    progress::Progress,
    runner::{ self, Login },
};

#[derive(Parser, Debug)]
#[command(name = "bios_fetch", version, about = "Fetch and summarize BIOS web-service data")]
pub struct Args {
    /// Service root
    #[arg(long, env = "BIOS_BASE_URL", default_value = BASE_URL, global = true)]
    base_url: String,

    #[arg(long, env = "BIOS_USERNAME", global = true)]
    username: Option<String>,

    #[arg(long, env = "BIOS_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Reuse a bearer token instead of logging in
    #[arg(long, env = "BIOS_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Rows per page (offset listings)
    #[arg(long, default_value_t = PAGE_SIZE, global = true)]
    page_size: u32,

    /// Request ceiling per endpoint
    #[arg(long, default_value_t = MAX_PAGES, global = true)]
    max_pages: u32,

    /// Pause between requests, in milliseconds
    #[arg(long, default_value_t = REQUEST_PAUSE_MS, global = true)]
    delay_ms: u64,

    #[arg(long, value_enum, default_value_t = Format::Csv, global = true)]
    format: Format,

    /// Output file, or directory with --per-endpoint. `-` writes to stdout.
    #[arg(short = 'o', long = "out", global = true)]
    out: Option<String>,

    #[arg(long, global = true)]
    no_headers: bool,

    /// Append logs to a file instead of stderr
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_LOG_FILE, global = true)]
    log_file: Option<PathBuf>,

    /// -v info, -vv debug
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Webservice onboarding status: one scored row per satker
    Status {
        /// Start date, as the portal expects it (e.g. 2025-01-01)
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        kdsatker: Option<String>,
        /// JSON column-alias table; omitted fields keep the built-in lists
        #[arg(long)]
        aliases: Option<PathBuf>,
    },
    /// Raw datasets; a bare path is resolved below the nextgen prefix
    Fetch {
        #[arg(required = true)]
        urls: Vec<String>,
        /// Endpoints answer in one response (no paging)
        #[arg(long, conflicts_with = "page_base")]
        single: bool,
        /// Number of the first page
        #[arg(long)]
        page_base: Option<u32>,
        #[arg(long)]
        kdsatker: Option<String>,
        /// Extra form filter, `key=value`
        #[arg(long = "filter", value_parser = parse_pair)]
        filters: Vec<(String, String)>,
        /// One file per endpoint in the output directory
        #[arg(long)]
        per_endpoint: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Tsv,
}

impl From<Format> for ExportFormat {
    fn from(f: Format) -> Self {
        match f { Format::Csv => ExportFormat::Csv, Format::Tsv => ExportFormat::Tsv }
    }
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (s!(k.trim()), s!(v.trim())))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got {s:?}"))
}

/// Prints fetch progress to stderr.
struct CliProgress {
    quiet: bool,
}

impl Progress for CliProgress {
    fn begin(&mut self, endpoint: &str) {
        if !self.quiet { eprintln!("→ {endpoint}"); }
    }
    fn log(&mut self, msg: &str) {
        if !self.quiet { eprintln!("  {msg}"); }
    }
    fn page_done(&mut self, page: u32, records: usize, total_pages: Option<u32>) {
        if self.quiet { return; }
        match total_pages {
            Some(t) => eprintln!("  page {page}/{t}: {records} rows"),
            None => eprintln!("  page {page}: {records} rows"),
        }
    }
    fn finish(&mut self, records: usize) {
        if !self.quiet { eprintln!("  {records} records"); }
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    match &args.log_file {
        Some(path) => crate::log::init(path, level)
            .wrap_err_with(|| format!("cannot install log file {}", path.display())),
        None => {
            env_logger::Builder::new()
                .filter_level(level)
                .parse_env("RUST_LOG")
                .try_init()
                .wrap_err("cannot install logger")
        }
    }
}

fn login(args: &Args) -> Result<Login> {
    if let Some(t) = &args.token {
        return Ok(Login::Token(Token::new(t.trim())));
    }
    match (&args.username, &args.password) {
        (Some(u), Some(p)) => Ok(Login::Password(Credentials::new(u, p))),
        _ => bail!("no credentials: pass --token, or --username and --password (or BIOS_* env vars)"),
    }
}

fn load_aliases(path: Option<&Path>) -> Result<ColumnAliases> {
    let Some(path) = path else { return Ok(ColumnAliases::default()) };
    let text = fs::read_to_string(path).wrap_err_with(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).wrap_err_with(|| format!("bad alias table in {}", path.display()))
}

fn app_options(args: &Args) -> AppOptions {
    let mut opts = AppOptions { base_url: args.base_url.clone(), ..AppOptions::default() };
    opts.fetch.page_size = args.page_size;
    opts.fetch.max_pages = args.max_pages;
    opts.fetch.delay = Duration::from_millis(args.delay_ms);
    opts.export.format = args.format.into();
    opts.export.include_headers = !args.no_headers;
    opts
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let mut opts = app_options(&args);
    let to_stdout = args.out.as_deref() == Some("-");
    let mut progress = CliProgress { quiet: to_stdout && args.verbose == 0 };

    let client = HttpClient::new().map_err(|e| eyre!("cannot build HTTP client: {e}"))?;
    let session = runner::open_session(&client, login(&args)?, &opts)?;

    match &args.command {
        Command::Status { from, to, kdsatker, aliases } => {
            let aliases = load_aliases(aliases.as_deref())?;
            if let Some(o) = args.out.as_deref().filter(|_| !to_stdout) {
                opts.export.set_path(o);
            }
            let report = runner::run_status(
                &client,
                &session,
                &opts,
                DateRange::new(from, to),
                kdsatker.as_deref(),
                &aliases,
                Some(&mut progress),
            );

            if to_stdout {
                print!("{}", to_export_string(&report.table(), opts.export.include_headers, opts.export.delim())?);
            } else if !report.rows.is_empty() {
                let path = runner::export_status(&report, &opts.export)?;
                eprintln!("{} satker → {}", report.rows.len(), path.display());
            } else {
                eprintln!("no rows to write");
            }

            if let Some(e) = report.error {
                return Err(eyre!(e).wrap_err(format!(
                    "status listing incomplete after {} page(s)",
                    report.pages_fetched
                )));
            }
        }

        Command::Fetch { urls, single, page_base, kdsatker, filters, per_endpoint } => {
            if *per_endpoint {
                if to_stdout { bail!("--per-endpoint needs an output directory"); }
                opts.export.export_type = ExportType::PerEndpoint;
            }
            match args.out.as_deref() {
                Some("-") => {}
                Some(o) => opts.export.set_path(o),
                None if !*per_endpoint => opts.export.set_path(&join!(DEFAULT_OUT_DIR, "/", DEFAULT_RAW_FILE)),
                None => {}
            }

            let pagination = if *single {
                Pagination::Single
            } else {
                Pagination::PageCount { index_base: page_base.unwrap_or(1) }
            };
            let endpoints: Vec<EndpointDescriptor> = urls
                .iter()
                .map(|u| {
                    let url = if u.starts_with("http://") || u.starts_with("https://") {
                        u.clone()
                    } else {
                        opts.nextgen_url(u)
                    };
                    let mut ep = EndpointDescriptor::new(url, pagination);
                    if let Some(k) = kdsatker {
                        ep = ep.with_kdsatker(k);
                    }
                    filters.iter().fold(ep, |ep, (k, v)| ep.with_filter(k, v))
                })
                .collect();

            let outcomes = runner::run_raw(&client, &session, &endpoints, &opts.fetch, Some(&mut progress));

            if to_stdout {
                let merged: Vec<_> = outcomes.iter().flat_map(|o| o.records.iter().cloned()).collect();
                let table = crate::normalize::flatten(&merged);
                print!("{}", to_export_string(&table, opts.export.include_headers, opts.export.delim())?);
            } else if outcomes.iter().any(|o| !o.records.is_empty()) {
                for path in runner::export_raw(&outcomes, &opts.export)? {
                    eprintln!("wrote {}", path.display());
                }
            }

            let failed: Vec<String> = outcomes
                .iter()
                .filter_map(|o| o.error.as_ref().map(|e| e.to_string()))
                .collect();
            let skipped = endpoints.len() - outcomes.len();
            if !failed.is_empty() || skipped > 0 {
                bail!("{} endpoint(s) failed, {skipped} skipped:\n  {}", failed.len(), failed.join("\n  "));
            }
        }
    }

    Ok(())
}
