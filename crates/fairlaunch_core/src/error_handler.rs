use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error produced by components outside this toolkit (orchestrators,
/// RPC providers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for the deployment toolkit.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("failed to read config file {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown network `{identifier}` (known: {})", known.join(", "))]
    UnknownNetwork {
        identifier: String,
        known: Vec<String>,
    },

    #[error("environment variable {var} is not set; it must hold the deployer mnemonic")]
    MissingCredential { var: String },

    #[error("invalid credential in {var}: {reason}")]
    InvalidCredential { var: String, reason: String },

    #[error("invalid RPC URL for {network}: {url}")]
    InvalidUrl { network: String, url: String },

    #[error("artifact error for {contract}: {reason}")]
    Artifact { contract: String, reason: String },

    #[error("constructor arguments do not match {contract}: {reason}")]
    ConstructorMismatch { contract: String, reason: String },

    #[error("module {module}: {reason}")]
    Module { module: String, reason: String },

    #[error("deployment of {module} failed")]
    Deployment {
        module: String,
        #[source]
        source: BoxError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Classification of errors for exit codes and user display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Missing or invalid settings, credentials, networks or artifacts.
    Configuration,
    /// Failure reported by the external deployment orchestrator.
    DelegatedDeployment,
    /// Local I/O failure.
    System,
}

impl LaunchError {
    /// Returns the broad error category for routing and display purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_)
            | Self::ConfigRead { .. }
            | Self::ConfigParse { .. }
            | Self::UnknownNetwork { .. }
            | Self::MissingCredential { .. }
            | Self::InvalidCredential { .. }
            | Self::InvalidUrl { .. }
            | Self::Artifact { .. }
            | Self::ConstructorMismatch { .. }
            | Self::Module { .. } => ErrorCategory::Configuration,
            Self::Deployment { .. } => ErrorCategory::DelegatedDeployment,
            Self::Io(_) => ErrorCategory::System,
        }
    }

    /// Whether this error is a misconfiguration.
    pub fn is_config(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::DelegatedDeployment | ErrorCategory::System => 1,
        }
    }

    /// Returns a user-friendly message including the underlying cause.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential { var } => {
                format!("Set {var} (or add it to .env) before running this command.")
            }
            Self::UnknownNetwork { identifier, known } => format!(
                "Network `{identifier}` is not configured. Choose one of: {}",
                known.join(", ")
            ),
            Self::Deployment { module, source } => {
                format!("Deployment of {module} failed: {source}")
            }
            Self::ConfigRead { source, .. } => format!("{self}: {source}"),
            Self::ConfigParse { source, .. } => format!("{self}: {source}"),
            other => other.to_string(),
        }
    }
}

pub type Result<T, E = LaunchError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_network_is_configuration_error() {
        let err = LaunchError::UnknownNetwork {
            identifier: "unknown-network".into(),
            known: vec!["base-local".into(), "base-mainnet".into()],
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.is_config());
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("base-local, base-mainnet"));
    }

    #[test]
    fn missing_credential_names_variable() {
        let err = LaunchError::MissingCredential {
            var: "WALLET_KEY".into(),
        };
        assert!(err.is_config());
        assert!(err.to_string().contains("WALLET_KEY"));
        assert!(err.user_message().contains(".env"));
    }

    #[test]
    fn deployment_error_keeps_source() {
        let source: BoxError = "insufficient funds for gas".into();
        let err = LaunchError::Deployment {
            module: "FairLaunchToken".into(),
            source,
        };
        assert_eq!(err.category(), ErrorCategory::DelegatedDeployment);
        assert_eq!(err.exit_code(), 1);

        let cause = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(cause.as_deref(), Some("insufficient funds for gas"));
        assert!(err.user_message().contains("insufficient funds"));
    }

    #[test]
    fn io_error_is_system() {
        let err: LaunchError = std::io::Error::other("disk full").into();
        assert_eq!(err.category(), ErrorCategory::System);
        assert_eq!(err.exit_code(), 1);
    }
}
