//! Declarative deployment modules.
//!
//! A module records which contracts to create and with which constructor
//! arguments. It never talks to a network: the resulting
//! [`ModuleDeclaration`] is resolved into transactions by an orchestrator.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use fairlaunch_core::{LaunchError, Result};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::debug;

/// A literal constructor argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Uint(U256),
    Address(Address),
    String(String),
}

impl ArgValue {
    /// Solidity type this value encodes as when no artifact says otherwise.
    pub fn sol_type(&self) -> &'static str {
        match self {
            Self::Uint(_) => "uint256",
            Self::Address(_) => "address",
            Self::String(_) => "string",
        }
    }

    pub fn to_sol_value(&self) -> DynSolValue {
        match self {
            Self::Uint(v) => DynSolValue::Uint(*v, 256),
            Self::Address(a) => DynSolValue::Address(*a),
            Self::String(s) => DynSolValue::String(s.clone()),
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(v) => write!(f, "{v}"),
            Self::Address(a) => write!(f, "{a}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl Serialize for ArgValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ArgValue", 2)?;
        state.serialize_field("type", self.sol_type())?;
        state.serialize_field("value", &self.to_string())?;
        state.end()
    }
}

impl From<u64> for ArgValue {
    fn from(v: u64) -> Self {
        Self::Uint(U256::from(v))
    }
}

impl From<u128> for ArgValue {
    fn from(v: u128) -> Self {
        Self::Uint(U256::from(v))
    }
}

impl From<U256> for ArgValue {
    fn from(v: U256) -> Self {
        Self::Uint(v)
    }
}

impl From<Address> for ArgValue {
    fn from(a: Address) -> Self {
        Self::Address(a)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Handle to a contract instance that will exist once the orchestrator has
/// executed the module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContractFuture {
    pub id: String,
    pub contract_name: String,
}

/// One contract creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractDeployment {
    pub future_id: String,
    pub contract_name: String,
    pub args: Vec<ArgValue>,
}

/// Named handles a module exposes to its caller.
pub type ModuleOutputs = BTreeMap<String, ContractFuture>;

/// Context handed to [`DeploymentModule::build`] for declaring contracts.
#[derive(Debug)]
pub struct ModuleBuilder {
    module_id: String,
    deployments: Vec<ContractDeployment>,
}

impl ModuleBuilder {
    fn new(module_id: &str) -> Self {
        Self {
            module_id: module_id.to_string(),
            deployments: Vec::new(),
        }
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// Declare a deployment of `contract_name` with the given constructor
    /// arguments, in order.
    pub fn contract(&mut self, contract_name: &str, args: Vec<ArgValue>) -> Result<ContractFuture> {
        if !is_identifier(contract_name) {
            return Err(self.error(format!("invalid contract name `{contract_name}`")));
        }
        let future_id = format!("{}#{}", self.module_id, contract_name);
        if self.deployments.iter().any(|d| d.future_id == future_id) {
            return Err(self.error(format!("duplicate future id `{future_id}`")));
        }

        debug!(module = %self.module_id, future = %future_id, args = args.len(), "contract declared");
        self.deployments.push(ContractDeployment {
            future_id: future_id.clone(),
            contract_name: contract_name.to_string(),
            args,
        });
        Ok(ContractFuture {
            id: future_id,
            contract_name: contract_name.to_string(),
        })
    }

    fn error(&self, reason: String) -> LaunchError {
        LaunchError::Module {
            module: self.module_id.clone(),
            reason,
        }
    }
}

/// A named, declarative description of contract instantiations.
pub trait DeploymentModule {
    fn id(&self) -> &str;

    fn build(&self, m: &mut ModuleBuilder) -> Result<ModuleOutputs>;
}

/// Everything a module declared, ready to be planned against a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDeclaration {
    pub module_id: String,
    pub deployments: Vec<ContractDeployment>,
    pub outputs: ModuleOutputs,
}

impl ModuleDeclaration {
    /// The deployment behind the named output, e.g. `token`.
    pub fn output(&self, name: &str) -> Option<&ContractDeployment> {
        let future = self.outputs.get(name)?;
        self.deployments.iter().find(|d| d.future_id == future.id)
    }
}

/// Run `module` against a fresh builder and collect its declaration.
pub fn declare<M: DeploymentModule + ?Sized>(module: &M) -> Result<ModuleDeclaration> {
    let module_id = module.id();
    if !is_identifier(module_id) {
        return Err(LaunchError::Module {
            module: module_id.to_string(),
            reason: "module id must be a non-empty identifier".into(),
        });
    }

    let mut builder = ModuleBuilder::new(module_id);
    let outputs = module.build(&mut builder)?;

    let declared: HashSet<&str> = builder
        .deployments
        .iter()
        .map(|d| d.future_id.as_str())
        .collect();
    if let Some((name, _)) = outputs.iter().find(|(_, f)| !declared.contains(f.id.as_str())) {
        return Err(builder.error(format!("output `{name}` was not declared by this module")));
    }

    Ok(ModuleDeclaration {
        module_id: module_id.to_string(),
        deployments: builder.deployments,
        outputs,
    })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    struct PairModule;

    impl DeploymentModule for PairModule {
        fn id(&self) -> &str {
            "Pair"
        }

        fn build(&self, m: &mut ModuleBuilder) -> Result<ModuleOutputs> {
            let a = m.contract("TokenA", vec!["A".into(), 18u64.into()])?;
            let b = m.contract("TokenB", vec!["B".into()])?;
            Ok(BTreeMap::from([("a".to_string(), a), ("b".to_string(), b)]))
        }
    }

    struct DuplicateModule;

    impl DeploymentModule for DuplicateModule {
        fn id(&self) -> &str {
            "Dup"
        }

        fn build(&self, m: &mut ModuleBuilder) -> Result<ModuleOutputs> {
            m.contract("Token", vec![])?;
            let t = m.contract("Token", vec![])?;
            Ok(BTreeMap::from([("t".to_string(), t)]))
        }
    }

    struct ForeignOutputModule;

    impl DeploymentModule for ForeignOutputModule {
        fn id(&self) -> &str {
            "Foreign"
        }

        fn build(&self, _m: &mut ModuleBuilder) -> Result<ModuleOutputs> {
            let stray = ContractFuture {
                id: "Other#Token".into(),
                contract_name: "Token".into(),
            };
            Ok(BTreeMap::from([("token".to_string(), stray)]))
        }
    }

    #[test]
    fn declare_collects_deployments_in_order() {
        let decl = declare(&PairModule).unwrap();
        assert_eq!(decl.module_id, "Pair");
        let ids: Vec<_> = decl.deployments.iter().map(|d| d.future_id.as_str()).collect();
        assert_eq!(ids, ["Pair#TokenA", "Pair#TokenB"]);
        assert_eq!(decl.outputs["a"].id, "Pair#TokenA");
        assert_eq!(decl.output("b").unwrap().args, vec![ArgValue::from("B")]);
        assert!(decl.output("missing").is_none());
    }

    #[test]
    fn duplicate_contract_is_rejected() {
        let err = declare(&DuplicateModule).unwrap_err();
        assert!(matches!(err, LaunchError::Module { ref module, .. } if module == "Dup"));
        assert!(err.to_string().contains("Dup#Token"));
    }

    #[test]
    fn output_must_belong_to_module() {
        let err = declare(&ForeignOutputModule).unwrap_err();
        assert!(err.to_string().contains("not declared"));
    }

    #[test]
    fn invalid_contract_name_is_rejected() {
        let mut builder = ModuleBuilder::new("M");
        assert!(builder.contract("", vec![]).is_err());
        assert!(builder.contract("1Token", vec![]).is_err());
        assert!(builder.contract("My Token", vec![]).is_err());
        assert!(builder.contract("My_Token$2", vec![]).is_ok());
    }

    #[test]
    fn arg_values_display_and_serialize() {
        let router = address!("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D");
        let args = [
            ArgValue::from(770_000_000_000_000u64),
            ArgValue::from(router),
            ArgValue::from("ULTRA"),
        ];
        assert_eq!(args[0].to_string(), "770000000000000");
        assert_eq!(
            args[1].to_string(),
            "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"
        );

        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json[0]["type"], "uint256");
        assert_eq!(json[0]["value"], "770000000000000");
        assert_eq!(json[2]["type"], "string");
        assert_eq!(json[2]["value"], "ULTRA");
    }

    #[test]
    fn default_sol_values() {
        assert_eq!(
            ArgValue::from(2u64).to_sol_value(),
            DynSolValue::Uint(U256::from(2u64), 256)
        );
        assert_eq!(
            ArgValue::from("x").to_sol_value(),
            DynSolValue::String("x".into())
        );
    }
}
