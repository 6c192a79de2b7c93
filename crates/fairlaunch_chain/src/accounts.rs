use std::fmt;

use fairlaunch_core::{LaunchError, Result};
use serde::Serialize;
use tracing::info;
use zeroize::Zeroizing;

/// Default BIP-44 derivation path for Ethereum accounts.
pub const DEFAULT_HD_PATH: &str = "m/44'/60'/0'/0";
/// Number of accounts derived from the mnemonic unless configured otherwise.
pub const DEFAULT_ACCOUNT_COUNT: u32 = 20;

const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// A BIP-39 seed phrase. Zeroed on drop and never printed.
#[derive(Clone)]
pub struct Mnemonic(Zeroizing<String>);

impl Mnemonic {
    /// Normalizes whitespace and checks the word count.
    fn parse(var: &str, raw: &str) -> Result<Self> {
        let words: Vec<&str> = raw.split_whitespace().collect();
        if !VALID_WORD_COUNTS.contains(&words.len()) {
            return Err(LaunchError::InvalidCredential {
                var: var.to_string(),
                reason: format!(
                    "expected 12, 15, 18, 21 or 24 words, found {}",
                    words.len()
                ),
            });
        }
        Ok(Self(Zeroizing::new(words.join(" "))))
    }

    pub fn word_count(&self) -> usize {
        self.0.split(' ').count()
    }

    /// The normalized phrase, for handing to a key-derivation backend.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic([REDACTED; {} words])", self.word_count())
    }
}

/// HD wallet account settings shared by every network profile.
#[derive(Debug, Clone)]
pub struct AccountSource {
    var: String,
    mnemonic: Mnemonic,
    pub path: String,
    pub initial_index: u32,
    pub count: u32,
}

/// Printable view of an [`AccountSource`] without the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountsSummary {
    pub source: String,
    pub words: usize,
    pub path: String,
    pub initial_index: u32,
    pub count: u32,
}

impl AccountSource {
    /// Read the mnemonic from the process environment.
    pub fn from_env(var: &str) -> Result<Self> {
        Self::from_lookup(var, |name| std::env::var(name).ok())
    }

    /// Read the mnemonic through `lookup`. A missing or blank value is a
    /// configuration error.
    pub fn from_lookup(var: &str, lookup: impl FnOnce(&str) -> Option<String>) -> Result<Self> {
        let raw = Zeroizing::new(lookup(var).unwrap_or_default());
        if raw.trim().is_empty() {
            return Err(LaunchError::MissingCredential {
                var: var.to_string(),
            });
        }
        let mnemonic = Mnemonic::parse(var, &raw)?;
        info!(var, words = mnemonic.word_count(), "deployer mnemonic loaded");
        Ok(Self {
            var: var.to_string(),
            mnemonic,
            path: DEFAULT_HD_PATH.to_string(),
            initial_index: 0,
            count: DEFAULT_ACCOUNT_COUNT,
        })
    }

    pub fn mnemonic(&self) -> &Mnemonic {
        &self.mnemonic
    }

    /// Name of the environment variable the mnemonic came from.
    pub fn var(&self) -> &str {
        &self.var
    }

    pub fn summary(&self) -> AccountsSummary {
        AccountsSummary {
            source: format!("env:{}", self.var),
            words: self.mnemonic.word_count(),
            path: self.path.clone(),
            initial_index: self.initial_index,
            count: self.count,
        }
    }
}
