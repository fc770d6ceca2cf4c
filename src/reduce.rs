// src/reduce.rs
//! One row per entity, scored by onboarding stage.

use std::collections::BTreeMap;

use chrono::{ DateTime, NaiveDate, NaiveDateTime, NaiveTime };
use log::debug;

use crate::normalize::CanonicalRow;

#[derive(Clone, Debug, PartialEq)]
pub struct FinalRow {
    pub sequence_no: usize,
    pub entity_key: String,
    pub entity_name: String,
    pub status: String,
    pub score: u32,
    pub weighted_score: f64,
}

pub const SCORE_WEIGHT: f64 = 0.2;

struct ScoreRule {
    contains: &'static str,
    unless: Option<&'static str>,
    score: u32,
}

// Checked in order; first hit wins.
const SCORE_RULES: &[ScoreRule] = &[
    ScoreRule { contains: "development", unless: Some("verif"), score: 10 },
    ScoreRule { contains: "verifikasi dev", unless: None, score: 20 },
    ScoreRule { contains: "request sk prod", unless: None, score: 50 },
    ScoreRule { contains: "verifikasi prod", unless: None, score: 60 },
];

/// Stage score for a status label. Unknown labels score 0.
pub fn score_status(status: &str) -> u32 {
    let s = status.trim().to_lowercase();
    SCORE_RULES
        .iter()
        .find(|r| s.contains(r.contains) && !r.unless.is_some_and(|u| s.contains(u)))
        .map_or(0, |r| r.score)
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Lenient timestamp parse. Offsets are folded into UTC.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let t = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(t, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(t, f).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

fn supersedes(candidate: Option<NaiveDateTime>, best: Option<NaiveDateTime>) -> bool {
    match (candidate, best) {
        (Some(c), Some(b)) => c > b,
        (Some(_), None) => true,
        (None, Some(_)) => false,
        (None, None) => true,
    }
}

/// Collapse `rows` to one row per (entity_key, entity_name), in ascending key order.
///
/// Within a group the row with the greatest parsed timestamp is kept; missing or
/// unparseable timestamps rank below any valid one. Equal valid timestamps keep the
/// earliest row; among rows without one the last occurrence is kept.
pub fn reduce(rows: &[CanonicalRow]) -> Vec<FinalRow> {
    let mut winners: BTreeMap<(&str, &str), (Option<NaiveDateTime>, usize)> = BTreeMap::new();

    for (idx, row) in rows.iter().enumerate() {
        let ts = row.timestamp.as_deref().and_then(parse_timestamp);
        if ts.is_none() && row.timestamp.is_some() {
            debug!("unparseable timestamp {:?} for {}", row.timestamp, row.entity_key);
        }
        winners
            .entry((row.entity_key.as_str(), row.entity_name.as_str()))
            .and_modify(|best| {
                if supersedes(ts, best.0) {
                    *best = (ts, idx);
                }
            })
            .or_insert((ts, idx));
    }

    debug!("reduced {} rows to {} entities", rows.len(), winners.len());

    winners
        .into_values()
        .enumerate()
        .map(|(i, (_, idx))| {
            let row = &rows[idx];
            let score = score_status(&row.status);
            FinalRow {
                sequence_no: i + 1,
                entity_key: row.entity_key.clone(),
                entity_name: row.entity_name.clone(),
                status: row.status.clone(),
                score,
                weighted_score: f64::from(score) * SCORE_WEIGHT,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, name: &str, status: &str, ts: Option<&str>) -> CanonicalRow {
        CanonicalRow {
            entity_key: s!(key),
            entity_name: s!(name),
            status: s!(status),
            timestamp: ts.map(String::from),
        }
    }

    #[test]
    fn stage_scores() {
        assert_eq!(score_status("In Development"), 10);
        assert_eq!(score_status("Verifikasi Development"), 20);
        assert_eq!(score_status("Request SK Produksi"), 50);
        assert_eq!(score_status("Verifikasi Produksi"), 60);
        assert_eq!(score_status("Unknown"), 0);
        assert_eq!(score_status("  VERIFIKASI produksi "), 60);
        assert_eq!(score_status(""), 0);
    }

    #[test]
    fn latest_timestamp_wins() {
        let rows = vec![
            row("001", "A", "Verifikasi Produksi", Some("2025-03-01 10:00:00")),
            row("001", "A", "In Development", Some("2025-01-01 10:00:00")),
            row("001", "A", "Verifikasi Development", Some("2025-02-01")),
        ];
        let out = reduce(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].status, "Verifikasi Produksi");
        assert_eq!(out[0].score, 60);
        assert!((out[0].weighted_score - 12.0).abs() < 1e-9);
    }

    #[test]
    fn mixed_formats_compare_by_instant() {
        let rows = vec![
            row("001", "A", "late", Some("05/03/2025")),
            row("001", "A", "early", Some("2025-03-04T23:59:59Z")),
        ];
        assert_eq!(reduce(&rows)[0].status, "late");
    }

    #[test]
    fn invalid_timestamps_rank_below_valid() {
        let rows = vec![
            row("001", "A", "valid", Some("2024-01-01")),
            row("001", "A", "garbage", Some("kemarin")),
            row("001", "A", "missing", None),
        ];
        assert_eq!(reduce(&rows)[0].status, "valid");
    }

    #[test]
    fn equal_timestamps_keep_earliest_row() {
        let rows = vec![
            row("001", "A", "first", Some("2025-01-01 10:00:00")),
            row("001", "A", "second", Some("2025-01-01 10:00:00")),
            row("001", "A", "undated", None),
        ];
        assert_eq!(reduce(&rows)[0].status, "first");
    }

    #[test]
    fn without_timestamps_last_occurrence_wins() {
        let rows = vec![
            row("001", "A", "first", None),
            row("002", "B", "only", None),
            row("001", "A", "last", None),
        ];
        let out = reduce(&rows);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].status, "last");
        assert_eq!(out[1].status, "only");
    }

    #[test]
    fn groups_by_key_and_name_in_sorted_order() {
        let rows = vec![
            row("002", "B", "In Development", None),
            row("001", "A", "In Development", None),
            row("001", "A (lama)", "Request SK Produksi", None),
        ];
        let out = reduce(&rows);
        let keys: Vec<_> = out.iter().map(|r| (r.entity_key.as_str(), r.entity_name.as_str())).collect();
        assert_eq!(keys, [("001", "A"), ("001", "A (lama)"), ("002", "B")]);
        let seq: Vec<_> = out.iter().map(|r| r.sequence_no).collect();
        assert_eq!(seq, [1, 2, 3]);
    }

    #[test]
    fn parses_supported_formats() {
        for t in [
            "2025-01-02T03:04:05+07:00",
            "2025-01-02 03:04:05",
            "2025-01-02 03:04:05.123",
            "2025-01-02T03:04:05",
            "2025-01-02",
            "2025/01/02",
            "2025/01/02 03:04:05",
            "02-01-2025",
            "02/01/2025",
        ] {
            assert!(parse_timestamp(t).is_some(), "{t}");
        }
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("2025-13-40").is_none());
    }

    #[test]
    fn empty_input() {
        assert!(reduce(&[]).is_empty());
    }
}
