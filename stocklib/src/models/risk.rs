//! Composite risk scoring for one instrument.
//!
//! The score blends three percentages computed over the trailing window the
//! prediction covers:
//!
//! - volatility: mean absolute day-to-day close change
//! - prediction error: mean absolute relative gap between actual and predicted
//! - trend consistency: how one-sided the up/down moves were
//!
//! `score = round(clamp(0.4 * volatility + 0.4 * error + 0.2 * (100 - trend), 0, 100))`
//!
//! Metrics that cannot be computed are `None`, never NaN or infinity.

use std::cmp::Ordering;

use serde::Serialize;

use crate::api::{PredictionResult, PriceSeries};
use crate::models::comparison::InstrumentSnapshot;

const VOLATILITY_WEIGHT: f64 = 0.4;
const ERROR_WEIGHT: f64 = 0.4;
const TREND_WEIGHT: f64 = 0.2;

const HIGH_RISK_ABOVE: u8 = 60;
const MEDIUM_RISK_ABOVE: u8 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> RiskLevel {
        if score > HIGH_RISK_ABOVE {
            RiskLevel::High
        } else if score > MEDIUM_RISK_ABOVE {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub score: Option<u8>,
    pub level: Option<RiskLevel>,
    pub volatility: Option<f64>,
    pub prediction_error: Option<f64>,
    pub trend_consistency: Option<f64>,
}

impl RiskAssessment {
    pub fn insufficient_data() -> RiskAssessment {
        RiskAssessment {
            score: None,
            level: None,
            volatility: None,
            prediction_error: None,
            trend_consistency: None,
        }
    }

    pub fn is_computable(&self) -> bool {
        self.score.is_some()
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn volatility(closes: &[f64]) -> Option<f64> {
    let changes: Vec<f64> = closes
        .windows(2)
        .filter(|pair| pair[0] != 0.0)
        .map(|pair| (pair[1] - pair[0]).abs() / pair[0] * 100.0)
        .collect();
    mean(&changes)
}

fn prediction_error(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    let errors: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .filter(|(a, _)| **a != 0.0)
        .map(|(a, p)| (a - p).abs() / a)
        .collect();
    mean(&errors).map(|e| e * 100.0)
}

fn trend_consistency(values: &[f64]) -> Option<f64> {
    let moves = values.len().checked_sub(1).filter(|&n| n > 0)?;
    let up_days = values.windows(2).filter(|pair| pair[1] > pair[0]).count();
    let down_days = moves - up_days;
    Some(up_days.abs_diff(down_days) as f64 / moves as f64 * 100.0)
}

fn composite_score(volatility: f64, prediction_error: f64, trend_consistency: f64) -> u8 {
    let raw = volatility * VOLATILITY_WEIGHT
        + prediction_error * ERROR_WEIGHT
        + (100.0 - trend_consistency) * TREND_WEIGHT;
    raw.clamp(0.0, 100.0).round() as u8
}

/// Scores one instrument from its price history and its model's output.
pub fn assess_risk(series: &PriceSeries, prediction: &PredictionResult) -> RiskAssessment {
    if series.len() < 2 {
        return RiskAssessment::insufficient_data();
    }

    let actual = &prediction.actual_prices;
    let closes = series.closes();
    let window = if actual.len() >= 2 {
        &closes[closes.len().saturating_sub(actual.len())..]
    } else {
        &closes[..]
    };
    let trend_values = if actual.len() >= 2 { &actual[..] } else { window };

    let volatility = volatility(window).filter(|v| v.is_finite());
    let prediction_error = prediction_error(actual, &prediction.predicted_prices).filter(|v| v.is_finite());
    let trend_consistency = trend_consistency(trend_values);

    let score = match (volatility, prediction_error, trend_consistency) {
        (Some(v), Some(e), Some(t)) => Some(composite_score(v, e, t)),
        _ => None,
    };

    RiskAssessment {
        score,
        level: score.map(RiskLevel::from_score),
        volatility,
        prediction_error,
        trend_consistency,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskEntry {
    pub symbol: String,
    pub name: String,
    pub assessment: RiskAssessment,
}

/// Risk for every instrument of a cycle, riskiest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RiskReport {
    pub entries: Vec<RiskEntry>,
}

impl RiskReport {
    pub fn from_snapshots(snapshots: &[InstrumentSnapshot]) -> RiskReport {
        let mut entries: Vec<RiskEntry> = snapshots
            .iter()
            .map(|s| RiskEntry {
                symbol: s.instrument.symbol.clone(),
                name: s.instrument.name.clone(),
                assessment: assess_risk(&s.series, &s.prediction),
            })
            .collect();

        // Not computable sorts after every scored entry
        entries.sort_by(|a, b| match (a.assessment.score, b.assessment.score) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| a.symbol.cmp(&b.symbol)));

        RiskReport { entries }
    }

    pub fn count_at(&self, level: RiskLevel) -> usize {
        self.entries
            .iter()
            .filter(|e| e.assessment.level == Some(level))
            .count()
    }
}
