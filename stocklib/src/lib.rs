pub mod api;
pub mod catalog;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod util;

pub use catalog::{Instrument, InstrumentCatalog};
pub use scheduler::{ComparisonSet, RefreshScheduler};
