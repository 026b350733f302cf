//! Program settings and template constants.
//!
//! Settings come from environment variables; `main` loads a `.env` file first
//! so they can also live there.

use crate::error::ConfigurationError;
use std::path::PathBuf;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";
pub const TEMPLATE_DESCRIPTION: &str =
    "Stack for creating a VPC with private subnets, public subnets and protected subnets";

/// Cost center tagged on the built-in plans in multi mode.
pub const DEFAULT_COST_CENTER: &str = "CC-NETWORK-001";
pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

pub const ENV_MODE: &str = "CFN_VPC_MODE";
pub const ENV_PLANS_FILE: &str = "CFN_VPC_PLANS_FILE";
pub const ENV_COST_CENTER: &str = "CFN_VPC_COST_CENTER";
pub const ENV_COMPACT: &str = "CFN_VPC_COMPACT";
pub const ENV_LOG_CONFIG: &str = "CFN_VPC_LOG_CONFIG";

/// Which built-in plans to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Dev only.
    #[default]
    Single,
    /// Dev, Stage and Prod in one template.
    Multi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub mode: Mode,
    /// JSON plan file; takes precedence over `mode`.
    pub plans_file: Option<PathBuf>,
    pub cost_center: Option<String>,
    pub pretty: bool,
    pub log_config: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            mode: Mode::Single,
            plans_file: None,
            cost_center: None,
            pretty: true,
            log_config: PathBuf::from(DEFAULT_LOG_CONFIG),
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Settings, ConfigurationError> {
        Settings::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut settings = Settings::default();

        if let Some(mode) = get(ENV_MODE) {
            settings.mode = match mode.to_lowercase().as_str() {
                "single" | "dev" => Mode::Single,
                "multi" | "all" => Mode::Multi,
                _ => {
                    return Err(ConfigurationError::InvalidSetting {
                        name: ENV_MODE.to_string(),
                        value: mode,
                        expected: "single, multi".to_string(),
                    })
                }
            };
        }
        if let Some(compact) = get(ENV_COMPACT) {
            settings.pretty = match compact.to_lowercase().as_str() {
                "1" | "true" | "yes" => false,
                "0" | "false" | "no" => true,
                _ => {
                    return Err(ConfigurationError::InvalidSetting {
                        name: ENV_COMPACT.to_string(),
                        value: compact,
                        expected: "true, false".to_string(),
                    })
                }
            };
        }
        settings.plans_file = get(ENV_PLANS_FILE).map(PathBuf::from);
        settings.cost_center = get(ENV_COST_CENTER);
        if let Some(path) = get(ENV_LOG_CONFIG) {
            settings.log_config = PathBuf::from(path);
        }

        log::debug!("settings: {:?}", settings);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.mode, Mode::Single);
        assert!(settings.pretty);
        assert_eq!(settings.log_config, PathBuf::from("log4rs.yml"));
    }

    #[test]
    fn test_all_settings() {
        let settings = Settings::from_lookup(lookup(&[
            (ENV_MODE, "Multi"),
            (ENV_PLANS_FILE, "plans.json"),
            (ENV_COST_CENTER, " CC-42 "),
            (ENV_COMPACT, "true"),
            (ENV_LOG_CONFIG, "conf/log.yml"),
        ]))
        .unwrap();
        assert_eq!(settings.mode, Mode::Multi);
        assert_eq!(settings.plans_file, Some(PathBuf::from("plans.json")));
        assert_eq!(settings.cost_center.as_deref(), Some("CC-42"));
        assert!(!settings.pretty);
        assert_eq!(settings.log_config, PathBuf::from("conf/log.yml"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let settings =
            Settings::from_lookup(lookup(&[(ENV_MODE, "  "), (ENV_COST_CENTER, "")])).unwrap();
        assert_eq!(settings.mode, Mode::Single);
        assert_eq!(settings.cost_center, None);
    }

    #[test]
    fn test_invalid_mode() {
        let err = Settings::from_lookup(lookup(&[(ENV_MODE, "staging")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid setting CFN_VPC_MODE='staging', expected one of: single, multi"
        );
    }

    #[test]
    fn test_invalid_compact() {
        assert!(matches!(
            Settings::from_lookup(lookup(&[(ENV_COMPACT, "maybe")])),
            Err(ConfigurationError::InvalidSetting { .. })
        ));
    }
}
