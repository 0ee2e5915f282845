use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Password, Text};
use sales_core::{Config, Pipeline, provider::provider_from_config, report::render_json};
use std::path::PathBuf;
use tracing::info;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Sales report enriched with customer and weather data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enrich a sales file and print the summary views.
    Run {
        /// Delimited sales file with customer_id, product, quantity, price and order_date columns.
        sales: PathBuf,

        /// OpenWeather API key; overrides the configured one.
        #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Customer directory URL; overrides the configured one.
        #[arg(long)]
        users_url: Option<String>,

        /// Field delimiter of the sales file.
        #[arg(long, default_value = ",", value_parser = parse_delimiter)]
        delimiter: u8,

        /// Length of the top-selling rankings.
        #[arg(long)]
        top: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Interactively configure credentials and endpoints.
    Configure,

    /// Show current weather for a "lat,lng" location.
    Weather {
        location: String,

        #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Run {
                sales,
                api_key,
                users_url,
                delimiter,
                top,
                format,
            } => {
                let mut config = Config::load()?;
                if let Some(key) = api_key {
                    config.set_weather_api_key(key);
                }
                if let Some(url) = users_url {
                    config.directory.users_url = url;
                }
                if let Some(n) = top {
                    config.report.top_n = n;
                }

                let report = Pipeline::new(config).run(&sales, delimiter).await?;
                info!(
                    enriched = report.enriched.len(),
                    skipped = report.skipped_customer_ids.len(),
                    weather_failures = report.weather_failures,
                    "run complete"
                );

                match format {
                    OutputFormat::Text => print!("{}", report.summary),
                    OutputFormat::Json => println!(
                        "{}",
                        render_json(&report.summary).context("Failed to serialize report")?
                    ),
                }
            }
            Command::Configure => configure()?,
            Command::Weather { location, api_key } => {
                let mut config = Config::load()?;
                if let Some(key) = api_key {
                    config.set_weather_api_key(key);
                }

                let provider = provider_from_config(&config)?;
                let obs = provider
                    .current(&location)
                    .await
                    .with_context(|| format!("Failed to fetch weather for {location}"))?;

                let temp = obs.temperature.map_or("n/a".to_string(), |t| format!("{t:.1} °C"));
                let conditions = obs.conditions.as_deref().unwrap_or("unknown");
                println!("{location}: {temp}, {conditions}");
            }
        }

        Ok(())
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_weather_api_key(api_key);

    config.directory.users_url = Text::new("Customer directory URL:")
        .with_default(&config.directory.users_url)
        .prompt()
        .context("Failed to read directory URL")?;

    let timeout = Text::new("Request timeout in seconds (empty for none):")
        .prompt()
        .context("Failed to read timeout")?;
    config.weather.timeout_secs = match timeout.trim() {
        "" => None,
        t => Some(t.parse().with_context(|| format!("Invalid timeout '{t}'"))?),
    };

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        v if v.len() == 1 && v.is_ascii() => Ok(v.as_bytes()[0]),
        v => Err(format!("delimiter must be a single ASCII character, got '{v}'")),
    }
}
