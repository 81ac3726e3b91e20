use rust_decimal::Decimal;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{BacktestSettings, ComparisonSettings, Config};

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file, deserializes it into our strongly-typed `Config`
/// struct, validates it, and returns it.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml"))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.backtest.initial_investment < Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "backtest.initial_investment must be non-negative".to_string(),
        ));
    }
    if config.backtest.monthly_investment < Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "backtest.monthly_investment must be non-negative".to_string(),
        ));
    }
    if config.comparison.max_workers == Some(0) {
        return Err(ConfigError::ValidationError(
            "comparison.max_workers must be at least 1 when set".to_string(),
        ));
    }
    Ok(())
}
