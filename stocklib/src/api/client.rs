use async_trait::async_trait;

use crate::api::errors::SourceError;
use crate::api::objects::{PredictionResult, PriceSeries};

/// The two remote queries the analytics core depends on.
///
/// Implementations must be safe to call concurrently for different symbols;
/// the aggregator issues every query of a cycle at once.
#[async_trait]
pub trait DataSourceClient: Send + Sync {
    async fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, SourceError>;
    async fn fetch_prediction(&self, symbol: &str) -> Result<PredictionResult, SourceError>;
}
