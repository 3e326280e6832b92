//! TOML parsing and validation.
//!
//! Parses protoforge.toml and validates structural constraints:
//! - Version must be "1"
//! - Generator must be set
//! - Override rules must name at least one prefix
//! - Descriptor targets must carry a prefix and a target path
//!
//! Colliding prefixes across override rules or descriptor targets are not
//! flagged: the last registration wins.

use super::types::*;
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a protoforge.toml file from disk.
pub fn parse_config_file(path: &Path) -> Result<Config, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_config(&content)
}

/// Parse a protoforge.toml from a string.
pub fn parse_config(toml: &str) -> Result<Config, String> {
    toml::from_str(toml).map_err(|e| format!("TOML parse error: {}", e))
}

/// Validate a parsed config. Returns a list of errors (empty = valid).
pub fn validate_config(config: &Config) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.version != "1" {
        errors.push(ValidationError {
            message: format!("version must be \"1\", got \"{}\"", config.version),
        });
    }

    if config.generator.is_empty() {
        errors.push(ValidationError {
            message: "generator must not be empty".to_string(),
        });
    }

    if config.compiler.is_empty() {
        errors.push(ValidationError {
            message: "compiler must not be empty".to_string(),
        });
    }

    for (i, rule) in config.overrides.iter().enumerate() {
        if rule.prefixes.is_empty() {
            errors.push(ValidationError {
                message: format!("override #{} names no prefixes", i + 1),
            });
        }
        if rule.prefixes.iter().any(|p| p.is_empty()) {
            errors.push(ValidationError {
                message: format!("override #{} has an empty prefix", i + 1),
            });
        }
    }

    for (i, target) in config.descriptors.iter().enumerate() {
        if target.prefix.is_empty() {
            errors.push(ValidationError {
                message: format!("descriptor target #{} has no prefix", i + 1),
            });
        }
        if target.target.as_os_str().is_empty() {
            errors.push(ValidationError {
                message: format!("descriptor target #{} has no target path", i + 1),
            });
        }
    }

    errors
}
