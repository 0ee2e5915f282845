use crate::{
    Config, WeatherObservation, error::WeatherError, provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of current weather conditions for a `"lat,lng"` location.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, location: &str) -> Result<WeatherObservation, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.weather_api_key()?;
    let http = config.http_client()?;

    let provider = OpenWeatherProvider::new(api_key.to_owned(), http)
        .with_endpoint(config.weather.endpoint.clone())
        .with_units(config.weather.units.clone());

    Ok(Box::new(provider))
}
