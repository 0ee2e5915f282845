//! Joining sales with customers and weather.

use std::collections::HashMap;
use tracing::{info, warn};

use crate::{
    error::WeatherError,
    model::{CustomerRecord, EnrichedSale, SaleRecord, WeatherObservation},
    provider::WeatherProvider,
};

/// What happened to a single sale during enrichment.
#[derive(Debug)]
pub enum EnrichOutcome {
    Enriched(EnrichedSale),
    /// Customer matched but the weather lookup failed; weather fields are empty.
    EnrichedWithoutWeather {
        sale: EnrichedSale,
        reason: WeatherError,
    },
    SkippedNoCustomer { customer_id: u64 },
}

impl EnrichOutcome {
    pub fn sale(&self) -> Option<&EnrichedSale> {
        match self {
            EnrichOutcome::Enriched(sale) | EnrichOutcome::EnrichedWithoutWeather { sale, .. } => {
                Some(sale)
            }
            EnrichOutcome::SkippedNoCustomer { .. } => None,
        }
    }

    pub fn into_sale(self) -> Option<EnrichedSale> {
        match self {
            EnrichOutcome::Enriched(sale) | EnrichOutcome::EnrichedWithoutWeather { sale, .. } => {
                Some(sale)
            }
            EnrichOutcome::SkippedNoCustomer { .. } => None,
        }
    }
}

/// Per-sale outcomes, in the order the sales were given.
#[derive(Debug, Default)]
pub struct Enrichment {
    pub outcomes: Vec<EnrichOutcome>,
}

impl Enrichment {
    pub fn sales(&self) -> impl Iterator<Item = &EnrichedSale> {
        self.outcomes.iter().filter_map(EnrichOutcome::sale)
    }

    pub fn into_sales(self) -> Vec<EnrichedSale> {
        self.outcomes.into_iter().filter_map(EnrichOutcome::into_sale).collect()
    }

    pub fn skipped_customer_ids(&self) -> Vec<u64> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                EnrichOutcome::SkippedNoCustomer { customer_id } => Some(*customer_id),
                _ => None,
            })
            .collect()
    }

    pub fn weather_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, EnrichOutcome::EnrichedWithoutWeather { .. }))
            .count()
    }
}

/// Index customers by id. A later duplicate replaces an earlier one.
pub fn customer_index(customers: &[CustomerRecord]) -> HashMap<u64, &CustomerRecord> {
    let mut index = HashMap::with_capacity(customers.len());
    for customer in customers {
        if index.insert(customer.id, customer).is_some() {
            warn!(id = customer.id, "duplicate customer id in directory, keeping the last one");
        }
    }
    index
}

/// Enrich every sale, one weather request at a time.
///
/// Unreachable weather or a non-200 status keeps the sale with empty weather;
/// a malformed 200 response stops enrichment with the error.
pub async fn enrich(
    sales: Vec<SaleRecord>,
    customers: &[CustomerRecord],
    provider: &dyn WeatherProvider,
) -> Result<Enrichment, WeatherError> {
    let index = customer_index(customers);
    let mut outcomes = Vec::with_capacity(sales.len());

    for sale in sales {
        let Some(customer) = index.get(&sale.customer_id) else {
            warn!(customer_id = sale.customer_id, "User with ID {} not found", sale.customer_id);
            outcomes.push(EnrichOutcome::SkippedNoCustomer {
                customer_id: sale.customer_id,
            });
            continue;
        };

        let location = customer.location();
        let outcome = match provider.current(&location).await {
            Ok(weather) => EnrichOutcome::Enriched(EnrichedSale::new(sale, customer, weather)),
            Err(reason) if !reason.is_recoverable() => return Err(reason),
            Err(reason) => {
                warn!(%location, error = %reason, "Failed to fetch weather data");
                EnrichOutcome::EnrichedWithoutWeather {
                    sale: EnrichedSale::new(sale, customer, WeatherObservation::default()),
                    reason,
                }
            }
        };
        outcomes.push(outcome);
    }

    let enrichment = Enrichment { outcomes };
    info!(
        retained = enrichment.sales().count(),
        skipped = enrichment.skipped_customer_ids().len(),
        weather_failures = enrichment.weather_failures(),
        "enrichment finished"
    );
    Ok(enrichment)
}
