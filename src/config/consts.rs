// src/config/consts.rs

// Net config
pub const BASE_URL: &str = "https://bios.kemenkeu.go.id";
pub const AUTH_PATH: &str = "/api2/authenticate";
pub const STATUS_DATA_PATH: &str = "/api/pengajuan/data";
pub const NEXTGEN_PREFIX: &str = "/api2/ws/nextgen/get/";
pub const REFERER_PATH: &str = "/webservice/pengajuan";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
pub const ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

// Timeouts (seconds)
pub const AUTH_TIMEOUT_SECS: u64 = 30;
pub const DATA_TIMEOUT_SECS: u64 = 60;

// Auth
pub const SUCCESS_SENTINEL: &str = "MSG20004";

// Pagination
pub const PAGE_SIZE: u32 = 1000;
pub const MAX_PAGES: u32 = 500;
pub const REQUEST_PAUSE_MS: u64 = 600; // be polite

// Diagnostics
pub const BODY_SNIPPET_CHARS: usize = 300;

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_STATUS_FILE: &str = "hasil_status_ws";
pub const DEFAULT_RAW_FILE: &str = "bios_data";
pub const DEFAULT_LOG_FILE: &str = ".store/debug.log";
