//! Shopping list export: cart aggregation plus the text/PDF renderers.
//!
//! The db layer hands over the *flattened* join of cart entries to their
//! recipes' ingredient rows; [`aggregate_lines`] does the grouping in
//! memory so the invariant stays testable without a database.

use std::collections::BTreeMap;
use std::path::PathBuf;

use db::cart::CartIngredientRow;
use serde::Serialize;
use thiserror::Error;

pub(crate) mod pdf;
pub(crate) mod text;

/// One summed row of the exported shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Sums amounts per (name, unit) pair. The grouping key is a case-sensitive
/// exact match on both components; output is ordered by name, then unit.
pub fn aggregate_lines(rows: Vec<CartIngredientRow>) -> Vec<AggregatedLine> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();

    for row in rows {
        *totals
            .entry((row.name, row.measurement_unit))
            .or_insert(0) += i64::from(row.amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), amount)| AggregatedLine {
            name,
            measurement_unit,
            amount,
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum RenderError {
    /// Both the aggregated lines and the recipe list were empty. Surfaced
    /// as a 400 rather than shipping a useless file.
    #[error("the shopping cart is empty, nothing to render")]
    EmptyDocument,
    #[error("failed to read renderer asset {path}: {source}")]
    Asset {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode logo image {path}: {source}")]
    Logo {
        path: PathBuf,
        source: printpdf::image_crate::ImageError,
    },
    #[error(transparent)]
    Pdf(#[from] printpdf::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, unit: &str, amount: i32) -> CartIngredientRow {
        CartIngredientRow {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn sums_amounts_per_name_and_unit() {
        // Recipe A: potato 500g + salt 5g; recipe B: potato 200g.
        let rows = vec![
            row("картофель", "г", 500),
            row("соль", "г", 5),
            row("картофель", "г", 200),
        ];

        let lines = aggregate_lines(rows);

        assert_eq!(
            lines,
            vec![
                AggregatedLine {
                    name: "картофель".to_string(),
                    measurement_unit: "г".to_string(),
                    amount: 700,
                },
                AggregatedLine {
                    name: "соль".to_string(),
                    measurement_unit: "г".to_string(),
                    amount: 5,
                },
            ]
        );
    }

    #[test]
    fn same_name_different_unit_stays_separate() {
        let rows = vec![row("молоко", "мл", 200), row("молоко", "г", 100)];

        let lines = aggregate_lines(rows);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].measurement_unit, "г");
        assert_eq!(lines[1].measurement_unit, "мл");
    }

    #[test]
    fn grouping_is_case_sensitive() {
        let rows = vec![row("Соль", "г", 5), row("соль", "г", 10)];

        let lines = aggregate_lines(rows);

        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn empty_cart_aggregates_to_empty_list() {
        assert!(aggregate_lines(Vec::new()).is_empty());
    }

    #[test]
    fn output_is_ordered_and_stable() {
        let rows = vec![
            row("яблоко", "шт", 3),
            row("банан", "шт", 2),
            row("яблоко", "шт", 1),
        ];

        let first = aggregate_lines(rows.clone());
        let second = aggregate_lines(rows);

        assert_eq!(first, second);
        assert_eq!(first[0].name, "банан");
        assert_eq!(first[1].amount, 4);
    }
}
