use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub import: ImportSettings,
    pub export: ExportSettings,
    pub logging: LoggingSettings,
}

/// Where the record store lives and how the pool is sized.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// A sqlx SQLite URL, e.g. `sqlite://enrollments.db`.
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportSettings {
    /// Bare file names given to the import command are looked up here.
    pub data_dir: PathBuf,
}

impl ImportSettings {
    /// Resolves a user supplied path. Anything that is absolute or contains a
    /// directory component is taken as-is.
    pub fn resolve(&self, input: &str) -> PathBuf {
        let path = PathBuf::from(input);
        if path.is_absolute() || path.components().count() > 1 {
            path
        } else {
            self.data_dir.join(path)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    pub json_file: String,
    pub csv_file: String,
}

impl ExportSettings {
    /// The default destination for an export of the given format.
    pub fn path_for(&self, format: ExportFormat) -> PathBuf {
        match format {
            ExportFormat::Json => self.output_dir.join(&self.json_file),
            ExportFormat::Csv => self.output_dir.join(&self.csv_file),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Log files are written here, rotated daily.
    pub directory: PathBuf,
    pub file_prefix: String,
}

/// Output formats supported by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "JSON"),
            ExportFormat::Csv => write!(f, "CSV"),
        }
    }
}
