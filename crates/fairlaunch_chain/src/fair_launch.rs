use std::collections::BTreeMap;

use alloy_primitives::{Address, address};
use fairlaunch_core::Result;

use crate::module::{ArgValue, DeploymentModule, ModuleBuilder, ModuleOutputs};

pub const MODULE_ID: &str = "FairLaunchToken";
pub const CONTRACT_NAME: &str = "FairLaunchToken";
/// Name of the output handle for the deployed token.
pub const TOKEN_OUTPUT: &str = "token";

/// 0.00077 ETH per unit, in wei.
pub const PRICE_WEI: u64 = 770_000_000_000_000;
pub const AMOUNT_PER_UNITS: u64 = 2;
/// 10 million tokens with 18 decimals.
pub const TOTAL_SUPPLY: u128 = 10_000_000_000_000_000_000_000_000;
pub const LAUNCHER: Address = address!("0x1429140EFBD4d5355706B63636F69127c2657658");
/// Uniswap V2 router.
pub const UNISWAP_ROUTER: Address = address!("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D");
/// Uniswap V2 factory.
pub const UNISWAP_FACTORY: Address = address!("0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");
pub const TOKEN_NAME: &str = "UltraCoin";
pub const TOKEN_SYMBOL: &str = "ULTRA";

/// Constructor parameters of `FairLaunchToken`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FairLaunchParams {
    pub price_wei: u64,
    pub amount_per_units: u64,
    pub total_supply: u128,
    pub launcher: Address,
    pub uniswap_router: Address,
    pub uniswap_factory: Address,
    pub name: String,
    pub symbol: String,
}

impl Default for FairLaunchParams {
    fn default() -> Self {
        Self {
            price_wei: PRICE_WEI,
            amount_per_units: AMOUNT_PER_UNITS,
            total_supply: TOTAL_SUPPLY,
            launcher: LAUNCHER,
            uniswap_router: UNISWAP_ROUTER,
            uniswap_factory: UNISWAP_FACTORY,
            name: TOKEN_NAME.to_string(),
            symbol: TOKEN_SYMBOL.to_string(),
        }
    }
}

impl FairLaunchParams {
    /// Arguments in constructor order.
    pub fn to_args(&self) -> Vec<ArgValue> {
        vec![
            self.price_wei.into(),
            self.amount_per_units.into(),
            self.total_supply.into(),
            self.launcher.into(),
            self.uniswap_router.into(),
            self.uniswap_factory.into(),
            self.name.as_str().into(),
            self.symbol.as_str().into(),
        ]
    }
}

/// Deploys one `FairLaunchToken` and exposes it as `token`.
#[derive(Debug, Clone, Default)]
pub struct FairLaunchModule {
    params: FairLaunchParams,
}

impl FairLaunchModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> &FairLaunchParams {
        &self.params
    }
}

impl DeploymentModule for FairLaunchModule {
    fn id(&self) -> &str {
        MODULE_ID
    }

    fn build(&self, m: &mut ModuleBuilder) -> Result<ModuleOutputs> {
        let token = m.contract(CONTRACT_NAME, self.params.to_args())?;
        Ok(BTreeMap::from([(TOKEN_OUTPUT.to_string(), token)]))
    }
}
