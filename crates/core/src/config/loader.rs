//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults.
    ///
    /// An explicit path must exist. Without one, the standard locations are
    /// searched and defaults are used when none is present.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => {
                let p = PathBuf::from(p);
                if !p.exists() {
                    return Err(Error::config_not_found(&p));
                }
                Some(p)
            }
            None => find_config_file(),
        };

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        if let Some(ref p) = config_path {
            schema.validate().context(format!("In {}", p.display()))?;
        } else {
            schema.validate()?;
        }

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let schema: ConfigSchema = toml::from_str(content)?;
        schema.validate()?;
        Ok(Self { schema, path: None })
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let mut candidates = vec![PathBuf::from("gigmap.toml"), PathBuf::from(".gigmap.toml")];

    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("gigmap").join("config.toml"));
    }

    candidates.into_iter().find(|c| c.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::config(format!("Failed to parse config file {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.presence.stale_after_minutes, 5);
        assert_eq!(config.schema.cropper.output_size, 500);
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[sync]\nmax_batch_ops = 100\nreserved_ops = 10\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = Config::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.schema.sync.batch_size(), 90);
        assert_eq!(config.schema.logging.level, "debug");
        // Untouched sections keep their defaults
        assert_eq!(config.schema.expiry.warning_minutes, 60);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some("/definitely/not/here/gigmap.toml")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let err = Config::from_toml("[presence\nstale_after_minutes = 5").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }

    #[test]
    fn test_inconsistent_values_are_rejected() {
        let err = Config::from_toml("[presence]\nfresh_within_minutes = 10").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
    }
}
