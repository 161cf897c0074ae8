//! Service configuration with TOML file support.
//!
//! ```toml
//! log_format = "json"
//! log_level = "info,arso_balloting=debug"
//!
//! [rules.acceptance]
//! approval_threshold_bps = 6000
//! max_disapprovals = 2
//!
//! [rules.quorum]
//! required_bps = 5000
//! ```
//!
//! Governance thresholds have no defaults. An absent `[rules.*]` section
//! leaves that rule unconfigured and operations needing it fail.

use crate::logging::{self, LogFormat};
use crate::ServiceError;
use arso_types::GovernanceRules;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log filter directives, e.g. "info" or "warn,arso_balloting=debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Acceptance criteria and quorum rule, in basis points.
    #[serde(default)]
    pub rules: GovernanceRules,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServiceConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ServiceError> {
        let config: Self = toml::from_str(s).map_err(|e| ServiceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ServiceError> {
        toml::to_string_pretty(self).map_err(|e| ServiceError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if !logging::is_valid_level(&self.log_level) {
            return Err(ServiceError::Config(format!(
                "invalid log_level {:?}",
                self.log_level
            )));
        }
        self.rules
            .validate()
            .map_err(|e| ServiceError::Config(format!("rules: {e}")))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            rules: GovernanceRules::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arso_types::{AcceptanceCriteria, QuorumRule};

    const FULL: &str = r#"
        log_format = "json"
        log_level = "debug"

        [rules.acceptance]
        approval_threshold_bps = 6000
        max_disapprovals = 2

        [rules.quorum]
        required_bps = 5000
    "#;

    #[test]
    fn empty_toml_uses_defaults_and_no_rules() {
        let config = ServiceConfig::from_toml_str("").expect("empty toml should parse");
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.log_format, LogFormat::Human);
        assert!(config.rules.acceptance.is_none());
        assert!(config.rules.quorum.is_none());
    }

    #[test]
    fn full_toml_sets_rules() {
        let config = ServiceConfig::from_toml_str(FULL).expect("should parse");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.rules.acceptance,
            Some(AcceptanceCriteria {
                approval_threshold_bps: 6000,
                max_disapprovals: 2,
            })
        );
        assert_eq!(config.rules.quorum, Some(QuorumRule { required_bps: 5000 }));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = ServiceConfig::from_toml_str(FULL).unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(ServiceConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = ServiceConfig::from_toml_str(
            r#"
            [rules.quorum]
            required_bps = 0
        "#,
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let err = ServiceConfig::from_toml_str(r#"log_level = "arso=loud""#).unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(ServiceConfig::from_toml_str(r#"log_format = "xml""#).is_err());
    }
}
