//! Error types for template generation.
//!
//! Failures split into two groups:
//! - [`ConfigurationError`] - bad plan input, raised before any resource is built
//! - [`BuildError`] - invariant violations while assembling the document

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template generation.
pub type Result<T> = std::result::Result<T, Error>;

/// Invalid input supplied to a network plan or to the program settings.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// A CIDR string that could not be parsed.
    #[error("Invalid CIDR '{value}': {reason}")]
    InvalidCidr { value: String, reason: String },

    /// Prefix length larger than 32 bits.
    #[error("Network length /{0} is too long")]
    PrefixTooLong(u8),

    /// Address has bits set below the prefix length.
    #[error("Plan '{plan}': {cidr} is not a network address (expected {expected})")]
    HostBitsSet {
        plan: String,
        cidr: String,
        expected: String,
    },

    /// Block size outside what AWS accepts for a VPC or subnet.
    #[error("Plan '{plan}': {cidr} must be between /{min} and /{max}")]
    BlockSize {
        plan: String,
        cidr: String,
        min: u8,
        max: u8,
    },

    /// Sub-range not inside the plan's root block.
    #[error("Plan '{plan}': {range} is not inside network {network}")]
    RangeOutsideNetwork {
        plan: String,
        range: String,
        network: String,
    },

    /// Two sub-ranges of the same plan share addresses.
    #[error("Plan '{plan}': {first} overlaps {second}")]
    OverlappingRanges {
        plan: String,
        first: String,
        second: String,
    },

    /// Id prefix unusable in CloudFormation logical ids.
    #[error(
        "Plan '{plan}': invalid id prefix '{prefix}' \
         (expected a letter followed by at most 199 letters or digits)"
    )]
    InvalidPrefix { plan: String, prefix: String },

    /// Two plans would generate the same logical ids.
    #[error("Plans '{first}' and '{second}' share the id prefix '{prefix}'")]
    DuplicatePrefix {
        prefix: String,
        first: String,
        second: String,
    },

    /// Plan file missing or unreadable.
    #[error("Error reading plan file {}: {source}", .path.display())]
    PlanFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Plan file is not a valid list of plans.
    #[error("Error parsing plan file {}: path={at} error={message}", .path.display())]
    PlanFileParse {
        path: PathBuf,
        at: String,
        message: String,
    },

    /// Environment setting with an unsupported value.
    #[error("Invalid setting {name}='{value}', expected one of: {expected}")]
    InvalidSetting {
        name: String,
        value: String,
        expected: String,
    },
}

/// Internal invariant violated while assembling a document.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Duplicate logical id '{0}'")]
    DuplicateLogicalId(String),

    #[error("Invalid logical id '{0}' (must be 1-255 alphanumeric characters)")]
    InvalidLogicalId(String),

    /// A `Ref`, `Fn::GetAtt` or `DependsOn` names an id missing from the document.
    #[error("Resource '{from}' references unknown logical id '{to}'")]
    DanglingReference { from: String, to: String },
}

/// Top-level error returned by the library entry points.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Error serializing template: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Error writing template: {0}")]
    Output(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_wraps_into_error() {
        let err: Error = ConfigurationError::PrefixTooLong(33).into();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Network length /33 is too long"
        );
    }

    #[test]
    fn test_build_error_message() {
        let err: Error = BuildError::DanglingReference {
            from: "DevNat".to_string(),
            to: "devpublicsubnet1".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Build error: Resource 'DevNat' references unknown logical id 'devpublicsubnet1'"
        );
    }
}
