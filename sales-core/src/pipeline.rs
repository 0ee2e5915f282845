//! Single pass from the sales file to the summary views.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::{
    Config,
    aggregate::SalesSummary,
    directory::DirectoryClient,
    enrich::enrich,
    loader::read_sales_file,
    model::{EnrichedSale, SaleRecord},
    provider::{WeatherProvider, provider_from_config},
};

/// Everything a run produced.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub enriched: Vec<EnrichedSale>,
    pub skipped_customer_ids: Vec<u64>,
    pub weather_failures: usize,
    pub summary: SalesSummary,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load `sales_path`, then enrich and summarise with the configured weather provider.
    pub async fn run(&self, sales_path: &Path, delimiter: u8) -> Result<RunReport> {
        let sales = read_sales_file(sales_path, delimiter)
            .with_context(|| format!("Failed to load sales from {}", sales_path.display()))?;
        info!(rows = sales.len(), path = %sales_path.display(), "loaded sales");

        let provider = provider_from_config(&self.config)?;
        self.process(sales, provider.as_ref()).await
    }

    /// Fetch customers, enrich `sales` and compute every view.
    pub async fn process(
        &self,
        sales: Vec<SaleRecord>,
        provider: &dyn WeatherProvider,
    ) -> Result<RunReport> {
        let directory = DirectoryClient::new(
            self.config.directory.users_url.clone(),
            self.config.http_client()?,
        );
        let customers = directory
            .fetch_customers()
            .await
            .context("Failed to load customer directory")?;
        info!(customers = customers.len(), "loaded customers");

        let enrichment = enrich(sales, &customers, provider)
            .await
            .context("Malformed weather response")?;
        let skipped_customer_ids = enrichment.skipped_customer_ids();
        let weather_failures = enrichment.weather_failures();
        let enriched = enrichment.into_sales();

        let summary = SalesSummary::compute(&enriched, self.config.report.top_n);

        Ok(RunReport {
            enriched,
            skipped_customer_ids,
            weather_failures,
            summary,
        })
    }
}
