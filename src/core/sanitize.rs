// src/core/sanitize.rs

/// Textual spellings of "no value" that upstream tables leak into string cells.
const MISSING_MARKERS: &[&str] = &["nan", "none", "null", "nat"];

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Trim a cell; empty or a missing-marker becomes `None`.
pub fn clean_cell(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() || MISSING_MARKERS.iter().any(|m| t.eq_ignore_ascii_case(m)) {
        None
    } else {
        Some(t.to_string())
    }
}

/// First `max` chars of a server body for error messages.
pub fn snippet(body: &str, max: usize) -> String {
    let flat = normalize_ws(body);
    match flat.char_indices().nth(max) {
        Some((cut, _)) => join!(&flat[..cut], "…"),
        None => flat,
    }
}

/// File stem for an endpoint: last path segment, ascii-safe.
pub fn sanitize_endpoint_filename(name: &str, idx: usize) -> String {
    let last = name.trim_end_matches('/').rsplit('/').next().unwrap_or(name);
    let last = last.split('?').next().unwrap_or(last);
    let mut out = String::with_capacity(last.len());
    let mut last_us = false;
    for ch in last.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' { out.push(ch); last_us = false; }
        else if !last_us { out.push('_'); last_us = true; }
    }
    let out = out.trim_matches('_').to_string();
    if out.is_empty() { format!("endpoint_{}", idx) } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_markers_are_absent() {
        assert_eq!(clean_cell("  "), None);
        assert_eq!(clean_cell("nan"), None);
        assert_eq!(clean_cell("None"), None);
        assert_eq!(clean_cell("NULL"), None);
        assert_eq!(clean_cell(" 415670 ").as_deref(), Some("415670"));
        assert_eq!(clean_cell("Nanggroe").as_deref(), Some("Nanggroe"));
    }

    #[test]
    fn snippet_cuts_long_bodies() {
        assert_eq!(snippet("short\n body", 300), "short body");
        let long = "x".repeat(400);
        let s = snippet(&long, 300);
        assert_eq!(s.chars().count(), 301);
        assert!(s.ends_with('…'));
    }

    #[test]
    fn endpoint_filenames() {
        assert_eq!(
            sanitize_endpoint_filename("https://h/api2/ws/nextgen/get/pendidikan/layanan/alumni", 0),
            "alumni"
        );
        assert_eq!(sanitize_endpoint_filename("saldo operasional?page=1", 0), "saldo_operasional");
        assert_eq!(sanitize_endpoint_filename("///", 4), "endpoint_4");
    }
}
