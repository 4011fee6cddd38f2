use crate::domain::client::Portfolio;
use crate::recommend::encoder::FeatureMatrix;

/// Quantity-weighted mean of the matrix rows the portfolio holds.
///
/// Holdings missing from the matrix are ignored. Returns a zero vector of
/// the matrix width when nothing matches.
pub fn aggregate(matrix: &FeatureMatrix, portfolio: &Portfolio) -> Vec<f64> {
    let mut query = vec![0.0; matrix.width()];
    let mut total_weight = 0.0;
    let mut matched = 0usize;

    for (symbol, row) in matrix.symbols().iter().zip(matrix.rows()) {
        let weight = portfolio.weight_of(symbol);
        if weight <= 0.0 || !weight.is_finite() {
            continue;
        }
        for (q, v) in query.iter_mut().zip(row) {
            *q += v * weight;
        }
        total_weight += weight;
        matched += 1;
    }

    if total_weight > 0.0 {
        for q in &mut query {
            *q /= total_weight;
        }
    }

    tracing::debug!(
        holdings = portfolio.len(),
        matched,
        total_weight,
        "portfolio query vector built"
    );
    query
}

pub fn is_zero(v: &[f64]) -> bool {
    v.iter().all(|x| *x == 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::Holding;
    use crate::domain::instrument::{CategoricalAttr, InstrumentRecord, NumericAttr, UniverseSchema};
    use crate::recommend::encoder::encode;

    fn matrix() -> FeatureMatrix {
        let records = vec![
            InstrumentRecord::new("A")
                .with_category(CategoricalAttr::Sector, "Tech")
                .with_numeric(NumericAttr::LastSale, 0.0),
            InstrumentRecord::new("B")
                .with_category(CategoricalAttr::Sector, "Health")
                .with_numeric(NumericAttr::LastSale, 10.0),
        ];
        let schema = UniverseSchema {
            categorical: vec![CategoricalAttr::Sector],
            numeric: vec![NumericAttr::LastSale],
        };
        encode(&records, &schema)
    }

    #[test]
    fn weighted_mean_of_held_rows() {
        // A = [1, 0, 0], B = [0, 1, 1]
        let p = Portfolio::new(vec![Holding::new("A", 3.0), Holding::new("B", 1.0)]);
        let q = aggregate(&matrix(), &p);
        assert_eq!(q, vec![0.75, 0.25, 0.25]);
    }

    #[test]
    fn single_holding_reproduces_its_row() {
        let m = matrix();
        let p = Portfolio::new(vec![Holding::new("B", 42.0)]);
        assert_eq!(aggregate(&m, &p), m.row("B").unwrap().to_vec());
    }

    #[test]
    fn no_match_gives_zero_vector_of_matrix_width() {
        let p = Portfolio::new(vec![Holding::new("ZZZ", 5.0)]);
        let q = aggregate(&matrix(), &p);
        assert_eq!(q.len(), 3);
        assert!(is_zero(&q));
    }

    #[test]
    fn empty_matrix_gives_empty_vector() {
        let p = Portfolio::new(vec![Holding::new("A", 1.0)]);
        assert!(aggregate(&FeatureMatrix::default(), &p).is_empty());
    }
}
