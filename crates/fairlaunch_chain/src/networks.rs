use std::collections::BTreeMap;

use fairlaunch_core::{LaunchError, NetworkSettings, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::accounts::AccountSource;

/// Gas price offered on every built-in network: 1 gwei.
pub const DEFAULT_GAS_PRICE_WEI: u128 = 1_000_000_000;

/// Built-in Base networks: identifier and RPC endpoint.
pub const BUILTIN_NETWORKS: [(&str, &str); 3] = [
    ("base-mainnet", "https://mainnet.base.org"),
    ("base-sepolia", "https://sepolia.base.org"),
    ("base-local", "http://localhost:8545"),
];

/// Connection parameters for one network.
#[derive(Debug, Clone)]
pub struct NetworkProfile {
    pub identifier: String,
    pub rpc_url: String,
    pub accounts: AccountSource,
    pub gas_price_wei: u128,
    pub is_custom: bool,
}

/// The parts of a [`NetworkProfile`] that are safe to print or persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkSummary {
    pub identifier: String,
    pub rpc_url: String,
    #[serde(with = "crate::serde_u128")]
    pub gas_price_wei: u128,
    pub is_custom: bool,
}

impl NetworkProfile {
    pub fn summary(&self) -> NetworkSummary {
        NetworkSummary {
            identifier: self.identifier.clone(),
            rpc_url: self.rpc_url.clone(),
            gas_price_wei: self.gas_price_wei,
            is_custom: self.is_custom,
        }
    }
}

/// Lookup table from network identifier to [`NetworkProfile`].
///
/// Built once at startup; identifiers are unique because they are the map
/// keys. Every profile shares the same account source.
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    profiles: BTreeMap<String, NetworkProfile>,
}

impl NetworkRegistry {
    /// Create a registry holding the built-in Base networks.
    pub fn with_defaults(accounts: AccountSource) -> Self {
        let profiles = BUILTIN_NETWORKS
            .iter()
            .map(|(id, url)| {
                let profile = NetworkProfile {
                    identifier: id.to_string(),
                    rpc_url: url.to_string(),
                    accounts: accounts.clone(),
                    gas_price_wei: DEFAULT_GAS_PRICE_WEI,
                    is_custom: false,
                };
                (id.to_string(), profile)
            })
            .collect();

        Self { profiles }
    }

    /// Apply config-file settings on top of the current table.
    ///
    /// A known identifier gets its URL and/or gas price replaced. An unknown
    /// identifier declares a new network and must give both values.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, NetworkSettings>) -> Result<()> {
        for (id, settings) in overrides {
            if id.trim().is_empty() {
                return Err(LaunchError::Config("network identifier must not be empty".into()));
            }
            if let Some(url) = &settings.url {
                if !validate_url(url) {
                    return Err(LaunchError::InvalidUrl {
                        network: id.clone(),
                        url: url.clone(),
                    });
                }
            }

            if let Some(profile) = self.profiles.get_mut(id) {
                if let Some(url) = &settings.url {
                    profile.rpc_url = url.clone();
                }
                if let Some(gas_price) = settings.gas_price {
                    profile.gas_price_wei = u128::from(gas_price);
                }
                profile.is_custom = true;
                debug!(network = %id, url = %profile.rpc_url, "network overridden");
                continue;
            }

            let (Some(url), Some(gas_price)) = (&settings.url, settings.gas_price) else {
                return Err(LaunchError::Config(format!(
                    "new network `{id}` needs both url and gas_price"
                )));
            };
            let accounts = self.shared_accounts()?;
            self.profiles.insert(
                id.clone(),
                NetworkProfile {
                    identifier: id.clone(),
                    rpc_url: url.clone(),
                    accounts,
                    gas_price_wei: u128::from(gas_price),
                    is_custom: true,
                },
            );
            info!(network = %id, url = %url, "custom network declared");
        }
        Ok(())
    }

    fn shared_accounts(&self) -> Result<AccountSource> {
        self.profiles
            .values()
            .next()
            .map(|p| p.accounts.clone())
            .ok_or_else(|| LaunchError::Config("network registry is empty".into()))
    }

    /// Look up a network by identifier.
    pub fn resolve(&self, identifier: &str) -> Result<&NetworkProfile> {
        self.profiles
            .get(identifier)
            .ok_or_else(|| LaunchError::UnknownNetwork {
                identifier: identifier.to_string(),
                known: self.identifiers(),
            })
    }

    /// All identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &NetworkProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Validate that a URL is well-formed and uses HTTP or HTTPS.
pub fn validate_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            (scheme == "http" || scheme == "https") && parsed.host().is_some()
        }
        Err(_) => false,
    }
}
