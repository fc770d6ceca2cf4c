// src/endpoint.rs
//! What to fetch: one URL, its filters, and which pagination convention it speaks.

use crate::core::sanitize::sanitize_endpoint_filename;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub from_date: String,
    pub to_date: String,
}

impl DateRange {
    pub fn new(from_date: impl Into<String>, to_date: impl Into<String>) -> Self {
        Self { from_date: from_date.into(), to_date: to_date.into() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pagination {
    /// `GET ?draw=&start=&length=`; done on an empty or short page.
    Offset,
    /// `POST ?page=N`; the first page declares how many pages exist.
    /// `index_base` is the number of the first page (0 or 1).
    PageCount { index_base: u32 },
    /// One `POST`, no paging.
    Single,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointDescriptor {
    url: String,
    name: String,
    kdsatker: Option<String>,
    date_range: Option<DateRange>,
    extra: Vec<(String, String)>,
    pagination: Pagination,
}

impl EndpointDescriptor {
    pub fn new(url: impl Into<String>, pagination: Pagination) -> Self {
        let url = url.into();
        let name = sanitize_endpoint_filename(&url, 0);
        Self { url, name, kdsatker: None, date_range: None, extra: Vec::new(), pagination }
    }

    /// The "webservice status" listing: offset paging with an (empty) status filter.
    pub fn status_listing(url: impl Into<String>, range: DateRange) -> Self {
        Self::new(url, Pagination::Offset)
            .with_date_range(range)
            .with_filter("status", "")
    }

    /// A nextgen financial dataset (`data.datas` + `pageCount`), 1-based pages.
    pub fn nextgen(url: impl Into<String>) -> Self {
        Self::new(url, Pagination::PageCount { index_base: 1 })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Blank input means "all entities".
    pub fn with_kdsatker(mut self, kdsatker: impl Into<String>) -> Self {
        let k: String = kdsatker.into();
        let k = k.trim();
        self.kdsatker = if k.is_empty() { None } else { Some(s!(k)) };
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    pub fn url(&self) -> &str { &self.url }
    pub fn name(&self) -> &str { &self.name }
    pub fn kdsatker(&self) -> Option<&str> { self.kdsatker.as_deref() }
    pub fn date_range(&self) -> Option<&DateRange> { self.date_range.as_ref() }
    pub fn extra_filters(&self) -> &[(String, String)] { &self.extra }
    pub fn pagination(&self) -> Pagination { self.pagination }

    /// Filter pairs for form bodies: only what is set.
    pub fn form_filters(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(k) = &self.kdsatker {
            out.push((s!("kdsatker"), k.clone()));
        }
        if let Some(r) = &self.date_range {
            out.extend(pairs!["from_date" => r.from_date.as_str(), "to_date" => r.to_date.as_str()]);
        }
        out.extend(self.extra.iter().cloned());
        out
    }

    /// Filter pairs for offset queries: `kdsatker` is always sent, empty when unset.
    pub fn query_filters(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(r) = &self.date_range {
            out.extend(pairs!["from_date" => r.from_date.as_str(), "to_date" => r.to_date.as_str()]);
        }
        out.push((s!("kdsatker"), self.kdsatker.clone().unwrap_or_default()));
        out.extend(self.extra.iter().cloned());
        out
    }
}
