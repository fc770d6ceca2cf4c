// src/progress.rs
/// Lightweight progress reporting for paginated fetches.
/// Frontends (CLI, dashboards) implement this to surface status to users.
pub trait Progress {
    /// Called once per endpoint before the first request.
    fn begin(&mut self, _endpoint: &str) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called after each page lands. `total_pages` is known only for page-count endpoints.
    fn page_done(&mut self, _page: u32, _records: usize, _total_pages: Option<u32>) {}

    /// Called at the end, successful or not.
    fn finish(&mut self, _records: usize) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Counts callbacks; handy for tests and summaries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tally {
    pub endpoints: usize,
    pub pages: Vec<(u32, usize)>,
    pub finished: usize,
}

impl Progress for Tally {
    fn begin(&mut self, _endpoint: &str) {
        self.endpoints += 1;
    }
    fn page_done(&mut self, page: u32, records: usize, _total_pages: Option<u32>) {
        self.pages.push((page, records));
    }
    fn finish(&mut self, _records: usize) {
        self.finished += 1;
    }
}
