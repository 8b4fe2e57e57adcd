use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{
    DatabaseSettings, ExportFormat, ExportSettings, ImportSettings, LoggingSettings, Settings,
};
pub use error::ConfigError;

/// The file read when no explicit path is given. Its absence is not an error.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Loads the application configuration.
///
/// Sources are layered, later ones winning: built-in defaults, the TOML file,
/// `ENROLLMENTS__SECTION__KEY` environment variables and finally `DATABASE_URL`.
/// An explicitly requested file must exist.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .set_default("database.url", "sqlite://enrollments.db")?
        .set_default("database.max_connections", 5_i64)?
        .set_default("import.data_dir", "testdata")?
        .set_default("export.output_dir", ".")?
        .set_default("export.json_file", "enrollments.json")?
        .set_default("export.csv_file", "enrollments.csv")?
        .set_default("logging.level", "info")?
        .set_default("logging.directory", "logs")?
        .set_default("logging.file_prefix", "enrollments.log")?
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("ENROLLMENTS")
                .prefix_separator("__")
                .separator("__"),
        )
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    validate(&settings)?;

    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.database.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "database.url must not be empty".to_string(),
        ));
    }
    if settings.database.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "database.max_connections must be at least 1".to_string(),
        ));
    }
    Ok(())
}
