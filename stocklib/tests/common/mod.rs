#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use stocklib::api::{DataSourceClient, PredictionResult, PricePoint, PriceSeries, SourceError};
use stocklib::{Instrument, InstrumentCatalog};

pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000_000.0,
        })
        .collect();
    PriceSeries::new(points).unwrap()
}

pub fn prediction(latest: f64, accuracy: f64) -> PredictionResult {
    PredictionResult {
        dates: Vec::new(),
        actual_prices: vec![100.0, 101.0, 102.0],
        predicted_prices: vec![100.5, 100.8, 102.4],
        latest_prediction: latest,
        direction_accuracy: accuracy,
        sentiment: None,
    }
}

pub fn catalog(n: usize) -> InstrumentCatalog {
    let instruments = (0..n)
        .map(|i| Instrument::new(&format!("SYM{:02}", i), &format!("Company {:02}", i)))
        .collect();
    InstrumentCatalog::new(instruments)
}

/// In-memory source with per-symbol failure modes and an optional response delay.
#[derive(Default)]
pub struct FakeSource {
    pub delay: Option<Duration>,
    pub failing_series: HashSet<String>,
    pub failing_predictions: HashSet<String>,
    pub short_series: HashSet<String>,
    pub incomplete_predictions: HashSet<String>,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        FakeSource::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail_series(mut self, symbol: &str) -> Self {
        self.failing_series.insert(symbol.to_string());
        self
    }

    pub fn fail_prediction(mut self, symbol: &str) -> Self {
        self.failing_predictions.insert(symbol.to_string());
        self
    }

    pub fn short_series(mut self, symbol: &str) -> Self {
        self.short_series.insert(symbol.to_string());
        self
    }

    pub fn incomplete_prediction(mut self, symbol: &str) -> Self {
        self.incomplete_predictions.insert(symbol.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DataSourceClient for FakeSource {
    async fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, SourceError> {
        self.wait().await;
        if self.failing_series.contains(symbol) {
            return Err(SourceError::Status(500));
        }
        if self.short_series.contains(symbol) {
            return Ok(series_from_closes(&[100.0]));
        }
        Ok(series_from_closes(&[100.0, 104.0, 102.5]))
    }

    async fn fetch_prediction(&self, symbol: &str) -> Result<PredictionResult, SourceError> {
        self.wait().await;
        if self.failing_predictions.contains(symbol) {
            return Err(SourceError::ModelNotFound(symbol.to_string()));
        }
        if self.incomplete_predictions.contains(symbol) {
            return Ok(prediction(f64::NAN, 50.0));
        }
        Ok(prediction(105.0, 62.5))
    }
}

/// Serves prediction queries from a script of (delay, accuracy) pairs, one per call.
pub struct ScriptedSource {
    script: Mutex<VecDeque<(Duration, f64)>>,
}

impl ScriptedSource {
    pub fn new(script: Vec<(Duration, f64)>) -> Self {
        ScriptedSource {
            script: Mutex::new(script.into()),
        }
    }
}

#[async_trait]
impl DataSourceClient for ScriptedSource {
    async fn fetch_series(&self, _symbol: &str) -> Result<PriceSeries, SourceError> {
        Ok(series_from_closes(&[100.0, 101.0]))
    }

    async fn fetch_prediction(&self, symbol: &str) -> Result<PredictionResult, SourceError> {
        let next = self.script.lock().unwrap().pop_front();
        let (delay, accuracy) = next.ok_or_else(|| SourceError::Service(format!("script exhausted for {}", symbol)))?;
        tokio::time::sleep(delay).await;
        Ok(prediction(101.0, accuracy))
    }
}
