//! Distinct value extraction for mapping.

use std::collections::{HashMap, HashSet};

use remap_model::{TabularDataset, canonical_string};

use crate::error::{IngestError, Result};

/// Distinct values per visible header, in first-seen order.
///
/// When several headers share a name, only the first one is indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueValueIndex {
    columns: Vec<(String, Vec<String>)>,
}

impl UniqueValueIndex {
    pub fn get(&self, column: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, values)| values.as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A distinct value with the number of cells holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFrequency {
    pub value: String,
    pub count: usize,
}

/// Distinct canonical values of `column`, excluding absent cells and empty strings.
pub fn compute_unique_values(dataset: &TabularDataset, column: &str) -> Result<Vec<String>> {
    let position = resolve_column(dataset, column)?;
    Ok(unique_at(dataset, position))
}

/// Unique values for every visible header.
pub fn build_value_index(dataset: &TabularDataset) -> UniqueValueIndex {
    let mut seen = HashSet::new();
    let columns = dataset
        .visible_headers()
        .into_iter()
        .filter(|header| seen.insert(header.name.clone()))
        .map(|header| {
            let values = unique_at(dataset, header.position);
            (header.name, values)
        })
        .collect();
    UniqueValueIndex { columns }
}

/// Unique values of `column` with occurrence counts, in first-seen order.
pub fn value_frequencies(dataset: &TabularDataset, column: &str) -> Result<Vec<ValueFrequency>> {
    let position = resolve_column(dataset, column)?;
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut frequencies: Vec<ValueFrequency> = Vec::new();
    for cell in dataset.column_cells(position) {
        let Some(value) = canonical_string(cell) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        if let Some(&slot) = slots.get(&*value) {
            frequencies[slot].count += 1;
        } else {
            slots.insert(value.to_string(), frequencies.len());
            frequencies.push(ValueFrequency {
                value: value.into_owned(),
                count: 1,
            });
        }
    }
    Ok(frequencies)
}

fn resolve_column(dataset: &TabularDataset, column: &str) -> Result<usize> {
    dataset
        .column_index(column)
        .ok_or_else(|| IngestError::ColumnNotFound {
            column: column.to_string(),
        })
}

fn unique_at(dataset: &TabularDataset, position: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut values = Vec::new();
    for cell in dataset.column_cells(position) {
        let Some(value) = canonical_string(cell) else {
            continue;
        };
        if value.is_empty() || seen.contains(&*value) {
            continue;
        }
        seen.insert(value.to_string());
        values.push(value.into_owned());
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use remap_model::CellValue;

    fn column_dataset(header: &str, cells: Vec<CellValue>) -> TabularDataset {
        TabularDataset::single_sheet(
            "Sheet1",
            vec![CellValue::text(header)],
            cells.into_iter().map(|cell| vec![cell]).collect(),
        )
    }

    #[test]
    fn excludes_absent_and_empty_values() {
        let dataset = column_dataset(
            "Code",
            vec![
                CellValue::text("a"),
                CellValue::text("b"),
                CellValue::text("a"),
                CellValue::text(""),
                CellValue::Empty,
                CellValue::text("b"),
            ],
        );
        let values = compute_unique_values(&dataset, "Code").expect("column exists");
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn numbers_and_text_share_canonical_form() {
        let dataset = column_dataset(
            "Grade",
            vec![
                CellValue::Number(3.0),
                CellValue::text("3"),
                CellValue::Number(3.5),
                CellValue::Bool(false),
            ],
        );
        let values = compute_unique_values(&dataset, "Grade").expect("column exists");
        assert_eq!(values, vec!["3", "3.5", "false"]);
    }

    #[test]
    fn missing_column_is_reported() {
        let dataset = column_dataset("Dept", vec![]);
        let err = compute_unique_values(&dataset, "Team").expect_err("no such column");
        assert!(matches!(err, IngestError::ColumnNotFound { ref column } if column == "Team"));
    }

    #[test]
    fn frequencies_count_occurrences() {
        let dataset = column_dataset(
            "Dept",
            vec![
                CellValue::text("HR"),
                CellValue::text("ENG"),
                CellValue::Empty,
                CellValue::text("HR"),
            ],
        );
        let frequencies = value_frequencies(&dataset, "Dept").expect("column exists");
        assert_eq!(
            frequencies,
            vec![
                ValueFrequency {
                    value: "HR".into(),
                    count: 2
                },
                ValueFrequency {
                    value: "ENG".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn index_covers_first_occurrence_of_each_header() {
        let dataset = TabularDataset::single_sheet(
            "Sheet1",
            vec![
                CellValue::text("Dept"),
                CellValue::Empty,
                CellValue::text("Dept"),
                CellValue::text("City"),
            ],
            vec![
                vec![
                    CellValue::text("HR"),
                    CellValue::text("x"),
                    CellValue::text("ignored"),
                    CellValue::text("Oslo"),
                ],
                vec![CellValue::text("ENG")],
            ],
        );
        let index = build_value_index(&dataset);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("Dept"), Some(&["HR".to_string(), "ENG".to_string()][..]));
        assert_eq!(index.get("City"), Some(&["Oslo".to_string()][..]));
        assert_eq!(index.columns().collect::<Vec<_>>(), vec!["Dept", "City"]);
    }

    proptest! {
        #[test]
        fn unique_values_are_distinct_and_non_empty(
            values in proptest::collection::vec(proptest::option::of("[a-c]{0,2}"), 0..40)
        ) {
            let dataset = column_dataset("V", values.into_iter().map(CellValue::from).collect());
            let unique = compute_unique_values(&dataset, "V").expect("column exists");
            let distinct: HashSet<&String> = unique.iter().collect();
            prop_assert_eq!(distinct.len(), unique.len());
            prop_assert!(unique.iter().all(|value| !value.is_empty()));
        }
    }
}
