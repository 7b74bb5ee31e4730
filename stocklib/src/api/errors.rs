/// Why a source query for one instrument did not produce usable data.
///
/// None of these are fatal: the aggregator drops the instrument from the cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    Http(String),
    Status(u16),
    Parse(String),
    Service(String),
    MissingField(&'static str),
    InvalidSeries(String),
    ModelNotFound(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SourceError::Http(msg) => write!(f, "http error: {}", msg),
            SourceError::Status(code) => write!(f, "received non-success status code: {}", code),
            SourceError::Parse(msg) => write!(f, "error parsing JSON: {}", msg),
            SourceError::Service(msg) => write!(f, "service error: {}", msg),
            SourceError::MissingField(field) => write!(f, "payload is missing field `{}`", field),
            SourceError::InvalidSeries(msg) => write!(f, "invalid price series: {}", msg),
            SourceError::ModelNotFound(symbol) => write!(f, "model not found for {}", symbol),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => SourceError::Status(status.as_u16()),
            None => SourceError::Http(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Parse(e.to_string())
    }
}
