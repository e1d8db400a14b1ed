//! Configuration file handling

use std::path::{Path, PathBuf};

use ddlscope_core::SqlDialect;
use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};

use crate::args::OutputFormat;

/// Configuration file looked up from the current directory upwards
pub const CONFIG_FILE: &str = "ddlscope.toml";

/// Where a project keeps its schema dump when nothing else is configured
pub const DEFAULT_SCHEMA_PATH: &str = "db/structure.sql";

/// Configuration for ddlscope
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Schema dump paths or glob patterns
    #[serde(default)]
    pub schema: Vec<String>,

    /// SQL dialect to force instead of detecting it
    #[serde(default)]
    pub dialect: Option<String>,

    /// Output format (human, json)
    #[serde(default)]
    pub format: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).into_diagnostic()
    }

    /// Try to find and load ddlscope.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let mut current_dir = std::env::current_dir().into_diagnostic()?;

        loop {
            let config_path = current_dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Ok(Some(Self::from_file(&config_path)?));
            }

            // Try parent directory
            if !current_dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(
        mut self,
        files: &[PathBuf],
        dialect: &Option<String>,
        format: &Option<OutputFormat>,
    ) -> Self {
        if !files.is_empty() {
            self.schema = files.iter().map(|p| p.display().to_string()).collect();
        }

        if dialect.is_some() {
            self.dialect = dialect.clone();
        }

        if let Some(fmt) = format {
            self.format = Some(format!("{:?}", fmt).to_lowercase());
        }

        self
    }

    /// The forced dialect, if one is configured
    pub fn dialect(&self) -> Result<Option<SqlDialect>> {
        match &self.dialect {
            Some(tag) => Ok(Some(tag.parse::<SqlDialect>()?)),
            None => Ok(None),
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        match self.format.as_deref() {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Human,
        }
    }

    /// Resolve configured schema entries to files, expanding glob patterns.
    /// Falls back to the conventional dump location when nothing is set.
    pub fn schema_files(&self) -> Result<Vec<PathBuf>> {
        if self.schema.is_empty() {
            return Ok(vec![PathBuf::from(DEFAULT_SCHEMA_PATH)]);
        }

        let mut files = Vec::new();
        for pattern in &self.schema {
            if pattern.contains('*') {
                for path in glob::glob(pattern).into_diagnostic()?.flatten() {
                    files.push(path);
                }
            } else {
                files.push(PathBuf::from(pattern));
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = Config::from_toml(
            r#"
            schema = ["db/structure.sql"]
            dialect = "postgres"
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.schema, vec!["db/structure.sql"]);
        assert_eq!(config.dialect().unwrap(), Some(SqlDialect::PostgreSQL));
        assert_eq!(config.output_format(), OutputFormat::Json);
    }

    #[test]
    fn test_args_override_config() {
        let config = Config {
            schema: vec!["a.sql".to_string()],
            dialect: Some("postgres".to_string()),
            format: None,
        };
        let config = config.merge_with_args(
            &[PathBuf::from("b.sql")],
            &Some("mysql".to_string()),
            &Some(OutputFormat::Json),
        );
        assert_eq!(config.schema, vec!["b.sql"]);
        assert_eq!(config.dialect().unwrap(), Some(SqlDialect::MySQL));
        assert_eq!(config.output_format(), OutputFormat::Json);
    }

    #[test]
    fn test_default_schema_location() {
        let config = Config::default();
        assert_eq!(
            config.schema_files().unwrap(),
            vec![PathBuf::from(DEFAULT_SCHEMA_PATH)]
        );
        assert_eq!(config.output_format(), OutputFormat::Human);
    }

    #[test]
    fn test_unsupported_dialect_in_config() {
        let config = Config {
            dialect: Some("sqlite".to_string()),
            ..Config::default()
        };
        assert!(config.dialect().is_err());
    }
}
