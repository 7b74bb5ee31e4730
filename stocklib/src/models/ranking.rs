use std::cmp::Ordering;
use std::collections::HashSet;

use feruca::Collator;
use serde::{Deserialize, Serialize};

use crate::models::comparison::ComparisonRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Accuracy,
    Price,
    Change,
    Name,
}

impl SortKey {
    /// Unknown keys fall back to `Accuracy`.
    pub fn parse(key: &str) -> SortKey {
        match key.trim().to_ascii_lowercase().as_str() {
            "accuracy" => SortKey::Accuracy,
            "price" => SortKey::Price,
            "change" => SortKey::Change,
            "name" => SortKey::Name,
            other => {
                log::warn!("Unknown sort key '{}', sorting by accuracy", other);
                SortKey::Accuracy
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Unknown orders fall back to `Desc`.
    pub fn parse(order: &str) -> SortOrder {
        match order.trim().to_ascii_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            other => {
                log::warn!("Unknown sort order '{}', sorting high to low", other);
                SortOrder::Desc
            }
        }
    }
}

/// Symbols the user picked to narrow the comparison view. Empty means "show all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    symbols: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    /// Adds the symbol if absent, removes it otherwise. Returns whether it is now selected.
    pub fn toggle(&mut self, symbol: &str) -> bool {
        if self.symbols.remove(symbol) {
            false
        } else {
            self.symbols.insert(symbol.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Selection {
            symbols: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// NaN stands in for a missing value and ranks below everything
fn numeric_key(value: f64) -> f64 {
    if value.is_nan() {
        f64::NEG_INFINITY
    } else {
        value
    }
}

// -0.0 and 0.0 are the same value here, so no total_cmp
fn compare_numeric(a: f64, b: f64) -> Ordering {
    numeric_key(a)
        .partial_cmp(&numeric_key(b))
        .unwrap_or(Ordering::Equal)
}

/// Unicode collation in CLDR root order. Accents and case only break ties
/// between equal base letters, and distinct names never compare equal.
pub fn compare_names(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b)
}

fn compare_by(key: SortKey, collator: &mut Collator, a: &ComparisonRecord, b: &ComparisonRecord) -> Ordering {
    match key {
        SortKey::Accuracy => compare_numeric(a.accuracy, b.accuracy),
        SortKey::Price => compare_numeric(a.current_price, b.current_price),
        SortKey::Change => compare_numeric(a.price_change_percent, b.price_change_percent),
        SortKey::Name => compare_names(collator, &a.name, &b.name),
    }
}

/// Returns a sorted, optionally filtered copy of `records`.
///
/// The sort is stable in both directions: `Desc` flips the comparison rather
/// than the output, so records with equal keys keep their input order.
pub fn rank(
    records: &[ComparisonRecord],
    key: SortKey,
    order: SortOrder,
    subset: Option<&Selection>,
) -> Vec<ComparisonRecord> {
    let mut collator = Collator::default();
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| match order {
        SortOrder::Asc => compare_by(key, &mut collator, a, b),
        SortOrder::Desc => compare_by(key, &mut collator, b, a),
    });

    match subset {
        Some(selection) if !selection.is_empty() => ranked
            .into_iter()
            .filter(|r| selection.contains(&r.symbol))
            .collect(),
        _ => ranked,
    }
}
