use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::api::client::DataSourceClient;
use crate::api::errors::SourceError;
use crate::api::objects::{PredictionResult, PricePoint, PriceSeries, Sentiment, SentimentLabel};

pub const DEFAULT_DAYS: usize = 90;
pub const PREDICTION_WINDOW: usize = 30;

const DEFAULT_BASE_PRICE: f64 = 1000.0;
const DAILY_MOVE_STD: f64 = 0.02;

fn base_price(symbol: &str) -> f64 {
    match symbol {
        "RELIANCE.NS" => 2450.0,
        "TCS.NS" => 3500.0,
        "HDFCBANK.NS" => 1650.0,
        "INFY.NS" => 1450.0,
        "SBIN.NS" => 580.0,
        "ICICIBANK.NS" => 950.0,
        "BHARTIARTL.NS" => 850.0,
        "HINDUNILVR.NS" => 2400.0,
        "ITC.NS" => 420.0,
        "KOTAKBANK.NS" => 1750.0,
        "LT.NS" => 3200.0,
        "AXISBANK.NS" => 1050.0,
        "WIPRO.NS" => 450.0,
        "MARUTI.NS" => 10500.0,
        "BAJFINANCE.NS" => 7200.0,
        _ => DEFAULT_BASE_PRICE,
    }
}

// FNV-1a, so the same symbol walks the same path on every run and platform
fn symbol_seed(symbol: &str) -> u64 {
    symbol.bytes().fold(0xcbf29ce484222325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    })
}

/// Share of day-to-day moves where the predicted direction matched the actual one, in percent.
pub fn direction_accuracy(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    let n = actual.len().min(predicted.len());
    if n < 2 {
        return None;
    }
    let hits = (1..n)
        .filter(|&i| (actual[i] > actual[i - 1]) == (predicted[i] > predicted[i - 1]))
        .count();
    Some(hits as f64 / (n - 1) as f64 * 100.0)
}

/// Positive when the model expects the price to rise above the last actual close.
pub fn sentiment_for(last_actual: f64, last_predicted: f64) -> Sentiment {
    let label = if last_predicted > last_actual {
        SentimentLabel::Positive
    } else {
        SentimentLabel::Negative
    };
    let confidence = if last_actual != 0.0 {
        Some(((last_predicted - last_actual) / last_actual * 100.0).abs().min(100.0))
    } else {
        None
    };
    Sentiment { label, confidence }
}

/// Offline data source: seeded random walks and a noisy persistence "model".
pub struct DemoDataSource {
    days: usize,
    end_date: NaiveDate,
    missing_models: HashSet<String>,
}

impl DemoDataSource {
    pub fn new(days: usize) -> Self {
        DemoDataSource {
            days,
            end_date: chrono::Utc::now().date_naive(),
            missing_models: HashSet::new(),
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = end_date;
        self
    }

    /// Symbols whose prediction query fails as if no trained model existed.
    pub fn with_missing_models<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_models.extend(symbols.into_iter().map(Into::into));
        self
    }

    // Daily moves are normal with a standard deviation of 2% of the base price
    fn generate_points(&self, symbol: &str) -> Result<Vec<PricePoint>, SourceError> {
        let base = base_price(symbol);
        let moves = Normal::new(0.0, base * DAILY_MOVE_STD)
            .map_err(|e| SourceError::InvalidSeries(format!("bad walk for {}: {}", symbol, e)))?;
        let mut rng = SmallRng::seed_from_u64(symbol_seed(symbol));
        let mut price = base;

        let mut points = Vec::with_capacity(self.days);
        for i in 0..self.days {
            let change = moves.sample(&mut rng);
            price = (price + change).max(base * 0.5);

            let offset = (self.days - i) as i64;
            points.push(PricePoint {
                date: self.end_date - Duration::days(offset),
                open: price * (1.0 + rng.gen_range(-0.01..0.01)),
                high: price * (1.0 + rng.gen_range(0.0..0.02)),
                low: price * (1.0 - rng.gen_range(0.0..0.02)),
                close: price,
                volume: rng.gen_range(1_000_000u64..10_000_000u64) as f64,
            });
        }
        Ok(points)
    }
}

impl Default for DemoDataSource {
    fn default() -> Self {
        DemoDataSource::new(DEFAULT_DAYS)
    }
}

#[async_trait]
impl DataSourceClient for DemoDataSource {
    async fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, SourceError> {
        PriceSeries::new(self.generate_points(symbol)?)
    }

    async fn fetch_prediction(&self, symbol: &str) -> Result<PredictionResult, SourceError> {
        if self.missing_models.contains(symbol) {
            return Err(SourceError::ModelNotFound(symbol.to_string()));
        }

        let points = self.generate_points(symbol)?;
        let window = &points[points.len().saturating_sub(PREDICTION_WINDOW)..];
        if window.len() < 2 {
            return Err(SourceError::InvalidSeries(format!(
                "{} days is too short to predict",
                window.len()
            )));
        }

        // Yesterday's close plus up to 1.5% noise
        let mut rng = SmallRng::seed_from_u64(symbol_seed(symbol).rotate_left(17));
        let actual: Vec<f64> = window.iter().map(|p| p.close).collect();
        let mut predicted = Vec::with_capacity(actual.len());
        predicted.push(actual[0]);
        for i in 1..actual.len() {
            predicted.push(actual[i - 1] * (1.0 + rng.gen_range(-0.015..0.015)));
        }

        let last_actual = actual[actual.len() - 1];
        let latest_prediction = predicted[predicted.len() - 1];
        let accuracy = direction_accuracy(&actual, &predicted)
            .ok_or(SourceError::MissingField("direction_accuracy"))?;

        Ok(PredictionResult {
            dates: window.iter().map(|p| p.date).collect(),
            actual_prices: actual,
            predicted_prices: predicted,
            latest_prediction,
            direction_accuracy: accuracy,
            sentiment: Some(sentiment_for(last_actual, latest_prediction)),
        })
    }
}
