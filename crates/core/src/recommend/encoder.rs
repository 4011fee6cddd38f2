use crate::domain::instrument::{CategoricalAttr, InstrumentRecord, NumericAttr, UniverseSchema};

/// Numeric representation of a batch of instruments.
///
/// Rows are aligned with `symbols`; every row has `columns.len()` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    symbols: Vec<String>,
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there is nothing to score: no rows or no feature columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn row(&self, symbol: &str) -> Option<&[f64]> {
        let idx = self.symbols.iter().position(|s| s == symbol)?;
        Some(&self.rows[idx])
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Categorical values that define the one-hot columns, per attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    entries: Vec<(CategoricalAttr, Vec<String>)>,
}

impl Vocabulary {
    /// Distinct values of every schema attribute, in first-seen order.
    pub fn observe(records: &[InstrumentRecord], schema: &UniverseSchema) -> Self {
        let entries = schema
            .categorical
            .iter()
            .map(|&attr| {
                let mut values: Vec<String> = Vec::new();
                for r in records {
                    let v = r.category(attr);
                    if !values.iter().any(|seen| seen == v) {
                        values.push(v.to_string());
                    }
                }
                (attr, values)
            })
            .collect();
        Self { entries }
    }

    pub fn values(&self, attr: CategoricalAttr) -> &[String] {
        self.entries
            .iter()
            .find(|(a, _)| *a == attr)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn column_count(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }
}

pub fn one_hot_column(attr: CategoricalAttr, value: &str) -> String {
    format!("{}_{}", attr.key(), value)
}

pub fn scaled_column(attr: NumericAttr) -> String {
    format!("{}_scaled", attr.key())
}

/// Encodes a batch with a vocabulary observed from the batch itself.
///
/// The column set therefore depends on the values present in `records`.
pub fn encode(records: &[InstrumentRecord], schema: &UniverseSchema) -> FeatureMatrix {
    let vocabulary = Vocabulary::observe(records, schema);
    encode_with_vocabulary(records, schema, &vocabulary)
}

/// Encodes a batch against a fixed categorical vocabulary.
///
/// Categorical values missing from `vocabulary` encode as all zeros for
/// their attribute. Numeric columns are always min-max scaled over `records`.
pub fn encode_with_vocabulary(
    records: &[InstrumentRecord],
    schema: &UniverseSchema,
    vocabulary: &Vocabulary,
) -> FeatureMatrix {
    if schema.is_empty() {
        tracing::debug!("no categorical or numeric attributes available; empty feature matrix");
        return FeatureMatrix::default();
    }
    if records.is_empty() {
        return FeatureMatrix::default();
    }

    let mut columns = Vec::with_capacity(vocabulary.column_count() + schema.numeric.len());
    for &attr in &schema.categorical {
        for value in vocabulary.values(attr) {
            columns.push(one_hot_column(attr, value));
        }
    }
    for &attr in &schema.numeric {
        columns.push(scaled_column(attr));
    }

    let scaled: Vec<Vec<f64>> = schema
        .numeric
        .iter()
        .map(|&attr| {
            let raw: Vec<f64> = records.iter().map(|r| r.numeric(attr)).collect();
            min_max_scale(&raw)
        })
        .collect();

    let mut rows = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let mut row = Vec::with_capacity(columns.len());
        for &attr in &schema.categorical {
            let value = record.category(attr);
            for candidate in vocabulary.values(attr) {
                row.push(if candidate == value { 1.0 } else { 0.0 });
            }
        }
        for column in &scaled {
            row.push(column[i]);
        }
        rows.push(row);
    }

    FeatureMatrix {
        symbols: records.iter().map(|r| r.symbol.clone()).collect(),
        columns,
        rows,
    }
}

/// `(x - min) / (max - min)`; a constant column scales to all zeros.
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if !range.is_finite() || range == 0.0 {
        return vec![0.0; values.len()];
    }

    values.iter().map(|v| (v - min) / range).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::UNKNOWN_CATEGORY;

    fn batch() -> Vec<InstrumentRecord> {
        vec![
            InstrumentRecord::new("AAPL")
                .with_category(CategoricalAttr::Sector, "Technology")
                .with_numeric(NumericAttr::PercentChange, 2.5)
                .with_numeric(NumericAttr::LastSale, 150.0),
            InstrumentRecord::new("JNJ")
                .with_category(CategoricalAttr::Sector, "Healthcare")
                .with_numeric(NumericAttr::PercentChange, 0.8)
                .with_numeric(NumericAttr::LastSale, 160.0),
            InstrumentRecord::new("MSFT")
                .with_category(CategoricalAttr::Sector, "Technology")
                .with_numeric(NumericAttr::PercentChange, 1.8),
        ]
    }

    fn schema() -> UniverseSchema {
        UniverseSchema {
            categorical: vec![CategoricalAttr::Sector],
            numeric: vec![NumericAttr::PercentChange, NumericAttr::LastSale],
        }
    }

    #[test]
    fn builds_one_hot_and_scaled_columns() {
        let m = encode(&batch(), &schema());

        assert_eq!(
            m.columns(),
            &[
                "sector_Technology".to_string(),
                "sector_Healthcare".to_string(),
                "pct_change_scaled".to_string(),
                "last_sale_scaled".to_string(),
            ]
        );
        assert_eq!(m.symbols(), &["AAPL", "JNJ", "MSFT"]);
        assert_eq!(m.row("AAPL").unwrap(), &[1.0, 0.0, 1.0, 150.0 / 160.0]);
        assert_eq!(m.row("JNJ").unwrap(), &[0.0, 1.0, 0.0, 1.0]);
        // Missing last sale counts as zero, the batch minimum.
        assert_eq!(m.row("MSFT").unwrap()[3], 0.0);
    }

    #[test]
    fn every_value_is_within_unit_interval() {
        let m = encode(&batch(), &schema());
        for row in m.rows() {
            for v in row {
                assert!((0.0..=1.0).contains(v), "value out of range: {v}");
            }
        }
        let pc = m.column_index("pct_change_scaled").unwrap();
        let col: Vec<f64> = m.rows().iter().map(|r| r[pc]).collect();
        assert!(col.contains(&0.0));
        assert!(col.contains(&1.0));
    }

    #[test]
    fn constant_column_scales_to_zero() {
        assert_eq!(min_max_scale(&[3.0, 3.0, 3.0]), vec![0.0, 0.0, 0.0]);
        assert_eq!(min_max_scale(&[]), Vec::<f64>::new());
        assert_eq!(min_max_scale(&[1.0, 3.0, 2.0]), vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn missing_category_becomes_unknown_column() {
        let records = vec![
            InstrumentRecord::new("A").with_category(CategoricalAttr::Country, "USA"),
            InstrumentRecord::new("B"),
        ];
        let schema = UniverseSchema {
            categorical: vec![CategoricalAttr::Country],
            numeric: vec![],
        };
        let m = encode(&records, &schema);
        let unknown = one_hot_column(CategoricalAttr::Country, UNKNOWN_CATEGORY);
        let idx = m.column_index(&unknown).unwrap();
        assert_eq!(m.row("B").unwrap()[idx], 1.0);
        assert_eq!(m.row("A").unwrap()[idx], 0.0);
    }

    #[test]
    fn empty_schema_yields_empty_matrix() {
        let m = encode(&batch(), &UniverseSchema::default());
        assert!(m.is_empty());
        assert_eq!(m.len(), 0);
    }

    #[test]
    fn fixed_vocabulary_keeps_columns_stable_across_batches() {
        let all = batch();
        let vocabulary = Vocabulary::observe(&all, &schema());

        let subset = &all[1..2];
        let m = encode_with_vocabulary(subset, &schema(), &vocabulary);
        assert_eq!(m.width(), 4);
        assert_eq!(m.row("JNJ").unwrap()[..2], [0.0, 1.0]);

        // Batch vocabulary only sees the healthcare value.
        assert_eq!(encode(subset, &schema()).width(), 3);
    }

    #[test]
    fn out_of_vocabulary_value_encodes_as_zeros() {
        let vocabulary = Vocabulary::observe(&batch()[..1], &schema());
        let m = encode_with_vocabulary(&batch()[1..2], &schema(), &vocabulary);
        assert_eq!(m.columns()[0], "sector_Technology");
        assert_eq!(m.row("JNJ").unwrap()[0], 0.0);
    }
}
