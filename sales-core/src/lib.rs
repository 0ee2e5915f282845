//! Core library for the `sales` CLI.
//!
//! This crate defines:
//! - Loading sales records and the customer directory
//! - A weather provider abstraction with an OpenWeather implementation
//! - Enrichment of sales with customer and weather data
//! - Summary views over the enriched table and their rendering
//!
//! It is used by `sales-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod config;
pub mod directory;
pub mod enrich;
pub mod error;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod report;

pub use aggregate::SalesSummary;
pub use config::Config;
pub use enrich::{EnrichOutcome, Enrichment, enrich};
pub use model::{CustomerRecord, EnrichedSale, SaleRecord, WeatherObservation};
pub use pipeline::{Pipeline, RunReport};
pub use provider::WeatherProvider;
