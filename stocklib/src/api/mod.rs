pub mod objects;
pub use objects::*;

pub mod helpers;
// pub use helpers::*;

pub mod client;
pub use client::*;

pub mod http_api;
pub use http_api::*;

pub mod demo_api;
pub use demo_api::*;

pub mod errors;
pub use errors::SourceError;
