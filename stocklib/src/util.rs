use std::sync::Arc;

use serde::Deserialize;

use crate::api::{DataSourceClient, DemoDataSource, HttpDataSource, DEFAULT_API_URL, DEFAULT_DAYS};
use crate::catalog::{Instrument, InstrumentCatalog};
use crate::models::{Selection, SortKey, SortOrder};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceSettings {
    Http {
        #[serde(default = "default_base_url")]
        base_url: String,
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
    },
    Demo {
        #[serde(default = "default_days")]
        days: usize,
        #[serde(default)]
        missing_models: Vec<String>,
    },
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings::Demo {
            days: DEFAULT_DAYS,
            missing_models: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub instruments: Option<Vec<Instrument>>,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    #[serde(default)]
    pub selected: Vec<String>,
    #[serde(default = "default_log_path")]
    pub log_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_days() -> usize {
    DEFAULT_DAYS
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_sort_by() -> String {
    "accuracy".to_string()
}

fn default_sort_order() -> String {
    "desc".to_string()
}

fn default_log_path() -> String {
    "logs/dashboard.log".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Settings, Box<dyn std::error::Error>> {
        serde_json::from_str(json).map_err(|e| e.into())
    }

    /// The configured instrument list, or the built-in catalog.
    pub fn catalog(&self) -> InstrumentCatalog {
        match &self.instruments {
            Some(instruments) => InstrumentCatalog::new(instruments.clone()),
            None => InstrumentCatalog::default(),
        }
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey::parse(&self.sort_by)
    }

    pub fn sort_order(&self) -> SortOrder {
        SortOrder::parse(&self.sort_order)
    }

    pub fn selection(&self) -> Selection {
        self.selected.iter().cloned().collect()
    }

    /// Selected symbols the catalog does not know; these never match a record.
    pub fn unknown_selections<'a>(&'a self, catalog: &InstrumentCatalog) -> Vec<&'a str> {
        self.selected
            .iter()
            .filter(|symbol| catalog.find(symbol).is_none())
            .map(String::as_str)
            .collect()
    }

    pub fn data_source(&self) -> Result<Arc<dyn DataSourceClient>, Box<dyn std::error::Error>> {
        match &self.source {
            SourceSettings::Http {
                base_url,
                timeout_secs,
            } => Ok(Arc::new(HttpDataSource::new(base_url, *timeout_secs)?)),
            SourceSettings::Demo {
                days,
                missing_models,
            } => Ok(Arc::new(
                DemoDataSource::new(*days).with_missing_models(missing_models.iter().cloned()),
            )),
        }
    }
}

pub fn read_settings(path: &str) -> Result<Settings, Box<dyn std::error::Error>> {
    let settings = std::fs::read_to_string(path)?;
    Settings::from_json(&settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings.source, SourceSettings::default());
        assert_eq!(settings.refresh_interval, 30);
        assert_eq!(settings.sort_key(), SortKey::Accuracy);
        assert_eq!(settings.sort_order(), SortOrder::Desc);
        assert!(settings.selection().is_empty());
        assert_eq!(settings.catalog().len(), 15);
        assert_eq!(settings.log_path, "logs/dashboard.log");
    }

    #[test]
    fn parses_http_source_and_overrides() {
        let json = r#"{
            "source": {"kind": "http", "base_url": "http://backend:5001"},
            "instruments": [{"symbol": "TCS.NS", "name": "Tata Consultancy Services"}],
            "refresh_interval": 10,
            "sort_by": "change",
            "sort_order": "asc",
            "selected": ["TCS.NS"]
        }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(
            settings.source,
            SourceSettings::Http {
                base_url: "http://backend:5001".to_string(),
                timeout_secs: 30,
            }
        );
        assert_eq!(settings.catalog().len(), 1);
        assert_eq!(settings.sort_key(), SortKey::Change);
        assert_eq!(settings.sort_order(), SortOrder::Asc);
        assert!(settings.selection().contains("TCS.NS"));
        assert!(settings.data_source().is_ok());
    }

    #[test]
    fn flags_selected_symbols_missing_from_the_catalog() {
        let settings = Settings::from_json(r#"{"selected": ["TCS.NS", "AAPL", "INFY.NS", "MSFT"]}"#).unwrap();
        assert_eq!(settings.unknown_selections(&settings.catalog()), vec!["AAPL", "MSFT"]);

        let narrowed = Settings::from_json(
            r#"{"instruments": [{"symbol": "AAPL", "name": "Apple"}], "selected": ["AAPL", "TCS.NS"]}"#,
        )
        .unwrap();
        assert_eq!(narrowed.unknown_selections(&narrowed.catalog()), vec!["TCS.NS"]);
    }

    #[test]
    fn parses_demo_source_with_missing_models() {
        let json = r#"{"source": {"kind": "demo", "missing_models": ["ITC.NS"]}}"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(
            settings.source,
            SourceSettings::Demo {
                days: DEFAULT_DAYS,
                missing_models: vec!["ITC.NS".to_string()],
            }
        );
    }

    #[test]
    fn unknown_source_kind_is_an_error() {
        assert!(Settings::from_json(r#"{"source": {"kind": "ftp"}}"#).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_settings("does/not/exist.json").is_err());
    }
}
