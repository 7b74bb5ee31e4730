use serde::Serialize;

use crate::models::comparison::ComparisonRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub symbol: String,
    pub name: String,
    pub value: f64,
}

/// Headline figures shown above the comparison table.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub best_performer: Option<Highlight>,
    pub highest_accuracy: Option<Highlight>,
    pub most_expensive: Option<Highlight>,
    pub average_accuracy: Option<f64>,
    pub count: usize,
}

fn or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// First record wins ties
fn highest_by(records: &[ComparisonRecord], field: impl Fn(&ComparisonRecord) -> f64) -> Option<Highlight> {
    let mut best = records.first()?;
    for record in &records[1..] {
        if or_zero(field(record)) > or_zero(field(best)) {
            best = record;
        }
    }
    Some(Highlight {
        symbol: best.symbol.clone(),
        name: best.name.clone(),
        value: or_zero(field(best)),
    })
}

impl ComparisonSummary {
    pub fn from_records(records: &[ComparisonRecord]) -> ComparisonSummary {
        if records.is_empty() {
            return ComparisonSummary::default();
        }

        let total_accuracy: f64 = records.iter().map(|r| or_zero(r.accuracy)).sum();

        ComparisonSummary {
            best_performer: highest_by(records, |r| r.price_change_percent),
            highest_accuracy: highest_by(records, |r| r.accuracy),
            most_expensive: highest_by(records, |r| r.current_price),
            average_accuracy: Some(total_accuracy / records.len() as f64),
            count: records.len(),
        }
    }
}
