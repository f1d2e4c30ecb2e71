//! The `config` module loads server settings from an optional file and the
//! environment, falling back to defaults for anything left unspecified.

mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{HubSettings, LogSettings, ServerSettings, Settings, StoreSettings};

/// Environment variables are read as `POPCHAT_<SECTION>__<KEY>`,
/// e.g. `POPCHAT_SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "POPCHAT";

/// Loads the configuration from `config/default` and environment variables
/// and merges it with default values.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config/default")
}

/// Same as [`load_config`] with an explicit file base name (extension optional).
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;
    let settings = partial.merge_with_defaults();

    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.hub.listener_queue_capacity == 0 {
        return Err(ConfigError::Message(
            "hub.listener_queue_capacity must be greater than zero".to_string(),
        ));
    }
    if settings.store.max_messages == Some(0) {
        return Err(ConfigError::Message(
            "store.max_messages must be greater than zero when set".to_string(),
        ));
    }
    Ok(())
}
