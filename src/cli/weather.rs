//! Weather subcommand implementation.

use super::Context;
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat};
use crate::weather::WeatherService;
use clap::Parser;

/// Show current weather.
#[derive(Parser, Debug)]
pub struct WeatherCommand {
    /// City to look up (defaults to the configured city)
    #[arg(short, long)]
    pub city: Option<String>,

    /// API key for the weather service
    #[arg(long, env = "SMARTBIN_WEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

impl WeatherCommand {
    /// Execute the weather command.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let settings = &ctx.settings;
        let api_key = self
            .api_key
            .clone()
            .or_else(|| settings.weather_api_key.clone());
        let city = self.city.as_deref().unwrap_or(&settings.default_city);

        let service = WeatherService::new(settings.weather_api_url.as_str(), api_key)
            .map_err(|e| CliError::Other(format!("failed to build weather client: {}", e)))?;
        let weather = service.current(city).await;

        output::print_weather(&weather, self.format)?;
        Ok(())
    }
}
