use futures::future::join_all;
use serde::Serialize;

use crate::api::{DataSourceClient, PredictionResult, PriceSeries, SentimentLabel, SourceError};
use crate::catalog::Instrument;

/// Both source results for one instrument, joined and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSnapshot {
    pub instrument: Instrument,
    pub series: PriceSeries,
    pub prediction: PredictionResult,
}

/// One instrument's row in the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRecord {
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub predicted_price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub accuracy: f64,
    pub sentiment: SentimentLabel,
    pub volume: f64,
    pub high: f64,
    pub low: f64,
}

impl ComparisonRecord {
    /// Returns `None` when the series has fewer than two bars.
    pub fn from_snapshot(snapshot: &InstrumentSnapshot) -> Option<ComparisonRecord> {
        let latest = snapshot.series.latest()?;
        let previous = snapshot.series.previous()?;

        let price_change = latest.close - previous.close;
        let price_change_percent = if previous.close != 0.0 {
            price_change / previous.close * 100.0
        } else {
            0.0
        };

        Some(ComparisonRecord {
            symbol: snapshot.instrument.symbol.clone(),
            name: snapshot.instrument.name.clone(),
            current_price: latest.close,
            predicted_price: snapshot.prediction.latest_prediction,
            price_change,
            price_change_percent,
            accuracy: snapshot.prediction.direction_accuracy,
            sentiment: snapshot
                .prediction
                .sentiment_label()
                .unwrap_or(SentimentLabel::Neutral),
            volume: latest.volume,
            high: latest.high,
            low: latest.low,
        })
    }
}

async fn fetch_snapshot<C>(client: &C, instrument: &Instrument) -> Result<InstrumentSnapshot, SourceError>
where
    C: DataSourceClient + ?Sized,
{
    let symbol = instrument.symbol.as_str();
    let (series, prediction) = futures::join!(client.fetch_series(symbol), client.fetch_prediction(symbol));

    let series = series?;
    let prediction = prediction?;

    if series.len() < 2 {
        return Err(SourceError::InvalidSeries(format!(
            "need at least 2 points, got {}",
            series.len()
        )));
    }
    prediction.validate()?;

    Ok(InstrumentSnapshot {
        instrument: instrument.clone(),
        series,
        prediction,
    })
}

/// Queries every instrument at once and keeps the ones whose data came back usable.
///
/// Both queries of an instrument run concurrently, and all instruments run
/// concurrently with each other. Failures are logged and dropped; the order
/// of the result is not meaningful.
pub async fn fetch_snapshots<C>(client: &C, instruments: &[Instrument]) -> Vec<InstrumentSnapshot>
where
    C: DataSourceClient + ?Sized,
{
    let pipelines = instruments.iter().map(|instrument| fetch_snapshot(client, instrument));
    let results = join_all(pipelines).await;

    let mut snapshots = Vec::with_capacity(results.len());
    for (instrument, result) in instruments.iter().zip(results) {
        match result {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(err) => log::warn!("Excluding {} from this cycle: {}", instrument.symbol, err),
        }
    }
    snapshots
}

pub async fn build_comparison_set<C>(client: &C, instruments: &[Instrument]) -> Vec<ComparisonRecord>
where
    C: DataSourceClient + ?Sized,
{
    let snapshots = fetch_snapshots(client, instruments).await;
    let records: Vec<ComparisonRecord> = snapshots.iter().filter_map(ComparisonRecord::from_snapshot).collect();

    log::info!(
        "Built comparison set: {} of {} instruments",
        records.len(),
        instruments.len()
    );
    records
}
