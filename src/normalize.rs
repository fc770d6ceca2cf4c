// src/normalize.rs
//! Heterogeneous records → canonical rows.
//!
//! Endpoint variants name the same column differently (`kdsatker` vs
//! `kode_satker`, `nmstatus` vs `status_webservice`, ...). Each canonical field
//! carries an ordered alias list; per record, the first alias present (compared
//! ASCII case-insensitively) wins. Aliases are passed per call so a new endpoint
//! variant only needs a new table, not new code.

use std::collections::HashMap;

use log::{ debug, warn };
use serde::Deserialize;
use serde_json::{ Map, Value };

use crate::core::extract::scalar_text;
use crate::core::sanitize::clean_cell;
use crate::table::DataSet;

/// One decoded record: column name → scalar JSON value.
pub type Record = Map<String, Value>;

/// Ordered alias lists per canonical field. Loadable from JSON; omitted fields
/// keep their default lists.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub entity_key: Vec<String>,
    pub entity_name: Vec<String>,
    pub status: Vec<String>,
    pub timestamp: Vec<String>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_lowercase()).collect()
}

impl Default for ColumnAliases {
    /// Aliases seen across the webservice-status endpoint family.
    fn default() -> Self {
        Self {
            entity_key: owned(&["kdsatker", "kode_satker"]),
            entity_name: owned(&["nmsatker", "nama_satker"]),
            status: owned(&["nmstatus", "status", "status_webservice"]),
            timestamp: owned(&["updated_at", "tgl_update", "created_at", "tgl_pengajuan", "tgl"]),
        }
    }
}

impl ColumnAliases {
    pub fn new(entity_key: &[&str], entity_name: &[&str], status: &[&str], timestamp: &[&str]) -> Self {
        Self {
            entity_key: owned(entity_key),
            entity_name: owned(entity_name),
            status: owned(status),
            timestamp: owned(timestamp),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalRow {
    pub entity_key: String,
    pub entity_name: String,
    pub status: String,
    pub timestamp: Option<String>,
}

/// Value of the first alias present in `record`. `None` when no alias matches.
/// A present key with a null value still counts as found.
fn resolve<'a>(record: &'a Record, aliases: &[String]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| {
        record
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(alias))
            .map(|(_, v)| v)
    })
}

fn cell(record: &Record, aliases: &[String]) -> Option<String> {
    resolve(record, aliases)
        .and_then(scalar_text)
        .and_then(|s| clean_cell(&s))
}

/// Canonical rows for every record that has entity key, name and status.
pub fn normalize(records: &[Record], aliases: &ColumnAliases) -> Vec<CanonicalRow> {
    for (field, list) in [
        ("entity key", &aliases.entity_key),
        ("entity name", &aliases.entity_name),
        ("status", &aliases.status),
    ] {
        if !records.is_empty() && !records.iter().any(|r| resolve(r, list).is_some()) {
            warn!("no column for {field} (tried {list:?}); treating it as empty");
        }
    }

    let rows: Vec<CanonicalRow> = records
        .iter()
        .filter_map(|r| {
            Some(CanonicalRow {
                entity_key: cell(r, &aliases.entity_key)?,
                entity_name: cell(r, &aliases.entity_name)?,
                status: cell(r, &aliases.status)?,
                timestamp: cell(r, &aliases.timestamp),
            })
        })
        .collect();

    debug!("normalized {} of {} records ({} dropped)", rows.len(), records.len(), records.len() - rows.len());
    rows
}

/// Raw table of every record: column union in first-seen order, missing cells blank.
/// Nested values are kept as compact JSON text.
pub fn flatten(records: &[Record]) -> DataSet {
    let mut headers: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for r in records {
        for k in r.keys() {
            if !index.contains_key(k) {
                index.insert(k.clone(), headers.len());
                headers.push(k.clone());
            }
        }
    }

    let rows = records
        .iter()
        .map(|r| {
            let mut row = vec![s!(); headers.len()];
            for (k, v) in r {
                if let Some(&i) = index.get(k) {
                    row[i] = match v {
                        Value::Array(_) | Value::Object(_) => v.to_string(),
                        other => scalar_text(other).unwrap_or_default(),
                    };
                }
            }
            row
        })
        .collect();

    DataSet { headers: Some(headers), rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> Record {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn aliases_resolve_case_insensitively_in_order() {
        let records = vec![
            rec(json!({"KDSATKER": "001", "NmSatker": "Satker A", "nmstatus": "Development"})),
            rec(json!({"kode_satker": "002", "nama_satker": "Satker B", "status_webservice": "Verifikasi Produksi"})),
            // `nmstatus` outranks `status` even when both are present
            rec(json!({"kdsatker": "003", "nmsatker": "Satker C", "status": "x", "nmstatus": "Request SK Produksi"})),
        ];
        let rows = normalize(&records, &ColumnAliases::default());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].entity_key, "001");
        assert_eq!(rows[0].entity_name, "Satker A");
        assert_eq!(rows[1].entity_key, "002");
        assert_eq!(rows[1].status, "Verifikasi Produksi");
        assert_eq!(rows[2].status, "Request SK Produksi");
    }

    #[test]
    fn cells_are_trimmed_and_missing_markers_dropped() {
        let records = vec![
            rec(json!({"kdsatker": " 001 ", "nmsatker": " A ", "nmstatus": " Dev ", "updated_at": " 2025-01-01 "})),
            rec(json!({"kdsatker": "nan", "nmsatker": "B", "nmstatus": "Dev"})),
            rec(json!({"kdsatker": "003", "nmsatker": "", "nmstatus": "Dev"})),
            rec(json!({"kdsatker": "004", "nmsatker": "D", "nmstatus": null})),
        ];
        let rows = normalize(&records, &ColumnAliases::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entity_key, "001");
        assert_eq!(rows[0].entity_name, "A");
        assert_eq!(rows[0].status, "Dev");
        assert_eq!(rows[0].timestamp.as_deref(), Some("2025-01-01"));
    }

    #[test]
    fn numeric_keys_become_text() {
        let records = vec![rec(json!({"kdsatker": 415670, "nmsatker": "A", "nmstatus": "Dev"}))];
        let rows = normalize(&records, &ColumnAliases::default());
        assert_eq!(rows[0].entity_key, "415670");
        assert_eq!(rows[0].timestamp, None);
    }

    #[test]
    fn unresolvable_required_column_drops_every_row() {
        let records = vec![rec(json!({"kdsatker": "001", "nmsatker": "A"}))];
        assert!(normalize(&records, &ColumnAliases::default()).is_empty());
    }

    #[test]
    fn custom_alias_table() {
        let aliases = ColumnAliases::new(&["kdsatker"], &["uraian"], &["ket"], &[]);
        let records = vec![rec(json!({"kdsatker": "9", "uraian": "Nine", "ket": "Development"}))];
        let rows = normalize(&records, &aliases);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entity_name, "Nine");
    }

    #[test]
    fn alias_table_from_json_keeps_defaults_for_omitted_fields() {
        let aliases: ColumnAliases = serde_json::from_str(r#"{"status": ["Ket_Status"]}"#).unwrap();
        assert_eq!(aliases.status, ["Ket_Status"]);
        assert_eq!(aliases.entity_key, ColumnAliases::default().entity_key);

        let records = vec![rec(json!({"kdsatker": "1", "nmsatker": "A", "ket_status": "Development"}))];
        assert_eq!(normalize(&records, &aliases)[0].status, "Development");
    }

    #[test]
    fn flatten_unions_columns_in_first_seen_order() {
        let records = vec![
            rec(json!({"kdsatker": "1", "saldo_akhir": 100})),
            rec(json!({"kdsatker": "2", "kdbank": "BRI", "detail": {"x": 1}})),
        ];
        let ds = flatten(&records);
        assert_eq!(ds.headers.as_deref().unwrap(), ["kdsatker", "saldo_akhir", "kdbank", "detail"]);
        assert_eq!(ds.rows[0], ["1", "100", "", ""]);
        assert_eq!(ds.rows[1], ["2", "", "BRI", r#"{"x":1}"#]);
    }
}
