use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::errors::SourceError;
use crate::api::helpers::{deserialize_date_from_string, deserialize_dates_from_strings, deserialize_f64_lenient};

/// One daily bar. Field names follow the backend's pandas records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(rename = "Date", deserialize_with = "deserialize_date_from_string")]
    pub date: NaiveDate,
    #[serde(rename = "Open", deserialize_with = "deserialize_f64_lenient")]
    pub open: f64,
    #[serde(rename = "High", deserialize_with = "deserialize_f64_lenient")]
    pub high: f64,
    #[serde(rename = "Low", deserialize_with = "deserialize_f64_lenient")]
    pub low: f64,
    #[serde(rename = "Close", deserialize_with = "deserialize_f64_lenient")]
    pub close: f64,
    #[serde(rename = "Volume", deserialize_with = "deserialize_f64_lenient")]
    pub volume: f64,
}

/// Daily history for one instrument, strictly increasing by date.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SourceError> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SourceError::InvalidSeries(format!(
                    "dates not strictly increasing at {}",
                    pair[1].date
                )));
            }
        }
        Ok(PriceSeries { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// The bar before the latest one, if the series has at least two.
    pub fn previous(&self) -> Option<&PricePoint> {
        self.points.len().checked_sub(2).map(|i| &self.points[i])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn from_label(label: &str) -> Option<SentimentLabel> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(SentimentLabel::Positive),
            "negative" => Some(SentimentLabel::Negative),
            "neutral" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub confidence: Option<f64>,
}

/// Model output for one instrument over its trailing prediction window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub dates: Vec<NaiveDate>,
    pub actual_prices: Vec<f64>,
    pub predicted_prices: Vec<f64>,
    pub latest_prediction: f64,
    pub direction_accuracy: f64,
    pub sentiment: Option<Sentiment>,
}

impl PredictionResult {
    pub fn sentiment_label(&self) -> Option<SentimentLabel> {
        self.sentiment.map(|s| s.label)
    }

    /// Checks the scalar fields a comparison record is built from.
    pub fn validate(&self) -> Result<(), SourceError> {
        if !self.latest_prediction.is_finite() {
            return Err(SourceError::MissingField("latest_prediction"));
        }
        if !self.direction_accuracy.is_finite() {
            return Err(SourceError::MissingField("direction_accuracy"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct StockResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Vec<PricePoint>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StockResponse {
    pub fn into_series(self) -> Result<PriceSeries, SourceError> {
        if !self.success {
            return Err(SourceError::Service(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        let points = self.data.ok_or(SourceError::MissingField("data"))?;
        PriceSeries::new(points)
    }
}

#[derive(Debug, Deserialize)]
pub struct SentimentPayload {
    #[serde(default)]
    pub sentiment_label: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PredictionPayload {
    #[serde(default, deserialize_with = "deserialize_dates_from_strings")]
    pub dates: Vec<NaiveDate>,
    #[serde(default)]
    pub actual: Vec<f64>,
    #[serde(default)]
    pub predicted: Vec<f64>,
    #[serde(default)]
    pub latest_prediction: Option<f64>,
    #[serde(default)]
    pub direction_accuracy: Option<f64>,
    #[serde(default)]
    pub sentiment: Option<SentimentPayload>,
}

impl PredictionPayload {
    pub fn into_result(self) -> Result<PredictionResult, SourceError> {
        let latest_prediction = self
            .latest_prediction
            .ok_or(SourceError::MissingField("latest_prediction"))?;
        let direction_accuracy = self
            .direction_accuracy
            .ok_or(SourceError::MissingField("direction_accuracy"))?;

        let sentiment = self.sentiment.and_then(|s| {
            let label = s.sentiment_label.as_deref().and_then(SentimentLabel::from_label)?;
            Some(Sentiment {
                label,
                confidence: s.confidence,
            })
        });

        let result = PredictionResult {
            dates: self.dates,
            actual_prices: self.actual,
            predicted_prices: self.predicted,
            latest_prediction,
            direction_accuracy,
            sentiment,
        };
        result.validate()?;
        Ok(result)
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    #[serde(default)]
    pub predictions: Option<PredictionPayload>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PredictResponse {
    pub fn into_prediction(self) -> Result<PredictionResult, SourceError> {
        if !self.success {
            return Err(SourceError::Service(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        self.predictions
            .ok_or(SourceError::MissingField("predictions"))?
            .into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stock_response() {
        let body = r#"{
            "success": true,
            "symbol": "TCS.NS",
            "data": [
                {"Date": "2024-01-01", "Open": 3500.0, "High": 3550.5, "Low": 3480.0, "Close": 3520.0, "Volume": 1200000},
                {"Date": "2024-01-02 00:00:00", "Open": 3520.0, "High": 3600.0, "Low": 3510.0, "Close": 3590.0, "Volume": 980000.0}
            ]
        }"#;
        let response: StockResponse = serde_json::from_str(body).unwrap();
        let series = response.into_series().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().unwrap().close, 3590.0);
        assert_eq!(series.previous().unwrap().volume, 1_200_000.0);
    }

    #[test]
    fn failed_stock_response_is_a_service_error() {
        let body = r#"{"success": false, "error": "No data for FOO"}"#;
        let response: StockResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.into_series(),
            Err(SourceError::Service("No data for FOO".to_string()))
        );
    }

    #[test]
    fn series_rejects_out_of_order_dates() {
        let point = |day: u32| PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 1.0,
        };
        assert!(PriceSeries::new(vec![point(1), point(2), point(3)]).is_ok());
        assert!(PriceSeries::new(vec![point(2), point(2)]).is_err());
        assert!(PriceSeries::new(vec![point(3), point(1)]).is_err());
    }

    #[test]
    fn parses_prediction_response() {
        let body = r#"{
            "success": true,
            "symbol": "INFY.NS",
            "predictions": {
                "dates": ["2024-01-01", "2024-01-02"],
                "actual": [1450.0, 1460.0],
                "predicted": [1448.0, 1471.0],
                "latest_prediction": 1471.0,
                "direction_accuracy": 66.6,
                "sentiment": {"sentiment_label": "Positive", "confidence": 0.75}
            }
        }"#;
        let response: PredictResponse = serde_json::from_str(body).unwrap();
        let prediction = response.into_prediction().unwrap();
        assert_eq!(prediction.latest_prediction, 1471.0);
        assert_eq!(prediction.sentiment_label(), Some(SentimentLabel::Positive));
        assert_eq!(prediction.dates.len(), 2);
    }

    #[test]
    fn prediction_without_required_fields_is_rejected() {
        let body = r#"{"success": true, "predictions": {"actual": [1.0], "predicted": [1.0], "direction_accuracy": 50.0}}"#;
        let response: PredictResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.into_prediction(),
            Err(SourceError::MissingField("latest_prediction"))
        );
    }

    #[test]
    fn unknown_sentiment_label_is_dropped() {
        let body = r#"{"success": true, "predictions": {
            "latest_prediction": 10.0, "direction_accuracy": 50.0,
            "sentiment": {"sentiment_label": "Bullish"}
        }}"#;
        let response: PredictResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_prediction().unwrap().sentiment, None);
    }
}
