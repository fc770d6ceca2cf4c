// src/table.rs
//! Plain string tables handed to the export writers.

use crate::reduce::FinalRow;

pub const STATUS_HEADERS: [&str; 6] = [
    "No",
    "Kode Satker",
    "Nama Satker",
    "Status Webservice",
    "Nilai",
    "Capaian",
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataSet {
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl DataSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<&[FinalRow]> for DataSet {
    fn from(rows: &[FinalRow]) -> Self {
        let rows = rows
            .iter()
            .map(|r| {
                vec![
                    r.sequence_no.to_string(),
                    r.entity_key.clone(),
                    r.entity_name.clone(),
                    r.status.clone(),
                    r.score.to_string(),
                    format!("{:.1}", r.weighted_score),
                ]
            })
            .collect();

        Self {
            headers: Some(STATUS_HEADERS.iter().map(|h| s!(*h)).collect()),
            rows,
        }
    }
}
