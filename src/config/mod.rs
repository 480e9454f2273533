mod settings;

use config::{Config, ConfigError, Environment, File};

pub use settings::{MqttSettings, PartialSettings, ServerSettings, Settings, StoreSettings};

/// Prefix for environment overrides, e.g. `HYDROCHILL__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "HYDROCHILL";

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the server, store and mqtt configurations
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(Settings::merged(partial))
}
