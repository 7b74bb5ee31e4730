use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
}

impl Instrument {
    pub fn new(symbol: &str, name: &str) -> Self {
        Instrument {
            symbol: symbol.to_string(),
            name: name.to_string(),
        }
    }
}

/// Ordered, read-only list of the instruments a dashboard tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentCatalog {
    instruments: Vec<Instrument>,
}

impl InstrumentCatalog {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        InstrumentCatalog { instruments }
    }

    pub fn list(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn find(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.symbol == symbol)
    }
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        InstrumentCatalog::new(vec![
            Instrument::new("AXISBANK.NS", "Axis Bank"),
            Instrument::new("BHARTIARTL.NS", "Bharti Airtel"),
            Instrument::new("BRITANNIA.NS", "Britannia Industries"),
            Instrument::new("HDFCBANK.NS", "HDFC Bank"),
            Instrument::new("HINDUNILVR.NS", "Hindustan Unilever"),
            Instrument::new("ICICIBANK.NS", "ICICI Bank"),
            Instrument::new("INFY.NS", "Infosys"),
            Instrument::new("ITC.NS", "ITC Limited"),
            Instrument::new("KOTAKBANK.NS", "Kotak Mahindra Bank"),
            Instrument::new("MARUTI.NS", "Maruti Suzuki"),
            Instrument::new("ONGC.NS", "Oil and Natural Gas Corporation"),
            Instrument::new("RELIANCE.NS", "Reliance Industries"),
            Instrument::new("SBIN.NS", "State Bank of India"),
            Instrument::new("TCS.NS", "Tata Consultancy Services"),
            Instrument::new("WIPRO.NS", "Wipro"),
        ])
    }
}
