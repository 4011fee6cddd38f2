//! Instrument universe loading from NASDAQ stock-screener style CSV exports.
//!
//! Column presence decides the [`UniverseSchema`]: a file without a
//! `Sector` column simply yields a universe without the sector attribute.

use crate::domain::instrument::{
    CategoricalAttr, InstrumentRecord, InstrumentUniverse, NumericAttr, UniverseSchema,
};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const SYMBOL_HEADERS: &[&str] = &["symbol"];
const NAME_HEADERS: &[&str] = &["name"];

fn categorical_headers(attr: CategoricalAttr) -> &'static [&'static str] {
    match attr {
        CategoricalAttr::Country => &["country"],
        CategoricalAttr::Sector => &["sector"],
        CategoricalAttr::Industry => &["industry"],
    }
}

fn numeric_headers(attr: NumericAttr) -> &'static [&'static str] {
    match attr {
        NumericAttr::PercentChange => &["% change", "pc", "pct_change", "percent change"],
        NumericAttr::LastSale => &["last sale", "ls", "last_sale"],
        NumericAttr::MarketCap => &["market cap", "mc", "market_cap"],
    }
}

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|a| h.trim().eq_ignore_ascii_case(a)))
}

pub fn load_screener_csv<P: AsRef<Path>>(path: P) -> Result<InstrumentUniverse> {
    let file = File::open(&path)
        .with_context(|| format!("failed to open screener file: {:?}", path.as_ref()))?;
    let universe = read_screener(file)
        .with_context(|| format!("failed to load screener file: {:?}", path.as_ref()))?;

    tracing::info!(
        path = %path.as_ref().display(),
        instruments = universe.len(),
        categorical = ?universe.schema().categorical,
        numeric = ?universe.schema().numeric,
        "instrument universe loaded"
    );
    Ok(universe)
}

pub fn read_screener<R: Read>(reader: R) -> Result<InstrumentUniverse> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().context("failed to read CSV header")?.clone();
    let symbol_idx = find_column(&headers, SYMBOL_HEADERS)
        .context("screener data has no Symbol column")?;
    let name_idx = find_column(&headers, NAME_HEADERS);

    let categorical: Vec<(CategoricalAttr, usize)> = CategoricalAttr::ALL
        .into_iter()
        .filter_map(|attr| find_column(&headers, categorical_headers(attr)).map(|i| (attr, i)))
        .collect();
    let numeric: Vec<(NumericAttr, usize)> = NumericAttr::ALL
        .into_iter()
        .filter_map(|attr| find_column(&headers, numeric_headers(attr)).map(|i| (attr, i)))
        .collect();

    let schema = UniverseSchema {
        categorical: categorical.iter().map(|(a, _)| *a).collect(),
        numeric: numeric.iter().map(|(a, _)| *a).collect(),
    };

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("malformed CSV row {}", line + 2))?;

        let mut record = InstrumentRecord::new(row.get(symbol_idx).unwrap_or_default());
        record.name = name_idx
            .and_then(|i| row.get(i))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        for &(attr, idx) in &categorical {
            if let Some(v) = row.get(idx).filter(|s| !s.is_empty()) {
                record = record.with_category(attr, v);
            }
        }
        for &(attr, idx) in &numeric {
            // Unparseable values count as zero, like missing ones.
            let v = row.get(idx).and_then(parse_num).unwrap_or(0.0);
            record = record.with_numeric(attr, v);
        }

        records.push(record);
    }

    Ok(InstrumentUniverse::new(schema, records))
}

/// Parses screener numbers such as `$1,234.50`, `-2.35%` or `NA`.
pub fn parse_num(s: &str) -> Option<f64> {
    let t: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | '%' | ',' | ' '))
        .collect();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Small built-in universe used when no screener file is configured.
pub fn sample_universe() -> InstrumentUniverse {
    let rows: [(&str, &str, &str, &str, f64, f64); 10] = [
        ("AAPL", "Apple Inc", "Technology", "Consumer Electronics", 2.5, 150.0),
        ("MSFT", "Microsoft Corp", "Technology", "Software—Infrastructure", 1.8, 330.0),
        ("GOOGL", "Alphabet Inc", "Technology", "Internet Content & Information", 3.2, 2800.0),
        ("AMZN", "Amazon.com Inc", "Consumer Cyclical", "Internet Retail", 1.2, 3400.0),
        ("NVDA", "NVIDIA Corp", "Technology", "Semiconductors", 5.7, 850.0),
        ("TSLA", "Tesla Inc", "Consumer Cyclical", "Auto Manufacturers", 3.1, 200.0),
        ("JNJ", "Johnson & Johnson", "Healthcare", "Drug Manufacturers—General", 0.8, 160.0),
        ("JPM", "JPMorgan Chase & Co", "Financial Services", "Banks—Diversified", 1.2, 170.0),
        ("V", "Visa Inc", "Financial Services", "Credit Services", 2.1, 230.0),
        ("PG", "Procter & Gamble Co", "Consumer Defensive", "Household & Personal Products", 0.5, 150.0),
    ];

    let records = rows
        .into_iter()
        .map(|(symbol, name, sector, industry, pc, ls)| {
            let mut r = InstrumentRecord::new(symbol)
                .with_category(CategoricalAttr::Country, "USA")
                .with_category(CategoricalAttr::Sector, sector)
                .with_category(CategoricalAttr::Industry, industry)
                .with_numeric(NumericAttr::PercentChange, pc)
                .with_numeric(NumericAttr::LastSale, ls);
            r.name = Some(name.to_string());
            r
        })
        .collect();

    let schema = UniverseSchema {
        categorical: CategoricalAttr::ALL.to_vec(),
        numeric: vec![NumericAttr::PercentChange, NumericAttr::LastSale],
    };
    InstrumentUniverse::new(schema, records)
}
