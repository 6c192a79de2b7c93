use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use alloy_primitives::Bytes;
use fairlaunch_core::{LaunchError, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::artifact::{ContractArtifact, encode_args};
use crate::module::{ArgValue, ModuleDeclaration};
use crate::networks::{NetworkProfile, NetworkSummary};

/// A contract creation resolved against a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedDeployment {
    pub future_id: String,
    pub contract_name: String,
    pub args: Vec<ArgValue>,
    /// ABI-encoded constructor parameters.
    pub encoded_args: Bytes,
    /// Bytecode plus encoded parameters; present when artifacts were given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_code: Option<Bytes>,
    /// SHA-256 over the contract name and creation payload.
    pub fingerprint: String,
}

/// A module declaration bound to one network, ready for an orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentPlan {
    pub module_id: String,
    pub network: NetworkSummary,
    pub deployments: Vec<PlannedDeployment>,
    /// Output name to future id.
    pub outputs: BTreeMap<String, String>,
}

impl DeploymentPlan {
    /// Resolve `declaration` against `profile`. When `artifacts_dir` is given
    /// every constructor call is checked against its compiled ABI and the
    /// creation code is included.
    pub fn new(
        declaration: &ModuleDeclaration,
        profile: &NetworkProfile,
        artifacts_dir: Option<&Path>,
    ) -> Result<Self> {
        let mut artifacts: HashMap<&str, ContractArtifact> = HashMap::new();
        let mut deployments = Vec::with_capacity(declaration.deployments.len());

        for deployment in &declaration.deployments {
            let name = deployment.contract_name.as_str();
            let (encoded_args, init_code) = match artifacts_dir {
                Some(dir) => {
                    if !artifacts.contains_key(name) {
                        artifacts.insert(name, ContractArtifact::load(dir, name)?);
                    }
                    let artifact = &artifacts[name];
                    let values = artifact.check_args(&deployment.args)?;
                    let encoded = Bytes::from(encode_args(&values));
                    let code = artifact.init_code_with(&encoded);
                    (encoded, Some(code))
                }
                None => {
                    let values: Vec<_> = deployment.args.iter().map(ArgValue::to_sol_value).collect();
                    (Bytes::from(encode_args(&values)), None)
                }
            };

            let payload = init_code.as_ref().unwrap_or(&encoded_args);
            deployments.push(PlannedDeployment {
                future_id: deployment.future_id.clone(),
                contract_name: deployment.contract_name.clone(),
                args: deployment.args.clone(),
                fingerprint: fingerprint(name, payload),
                encoded_args,
                init_code,
            });
        }

        let plan = Self {
            module_id: declaration.module_id.clone(),
            network: profile.summary(),
            deployments,
            outputs: declaration
                .outputs
                .iter()
                .map(|(name, future)| (name.clone(), future.id.clone()))
                .collect(),
        };
        info!(
            module = %plan.module_id,
            network = %plan.network.identifier,
            deployments = plan.deployments.len(),
            with_bytecode = artifacts_dir.is_some(),
            "deployment plan built"
        );
        Ok(plan)
    }

    pub fn deployment(&self, future_id: &str) -> Option<&PlannedDeployment> {
        self.deployments.iter().find(|d| d.future_id == future_id)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LaunchError::Config(format!("failed to serialize plan: {e}")))
    }
}

fn fingerprint(contract_name: &str, payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contract_name.as_bytes());
    hasher.update([0u8]);
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::tests::test_accounts;
    use crate::artifact::tests::{BYTECODE, fair_launch_abi, write_artifact};
    use crate::fair_launch::{FairLaunchModule, TOKEN_OUTPUT};
    use crate::module::declare;
    use crate::networks::NetworkRegistry;

    fn plan_for(network: &str, artifacts_dir: Option<&Path>) -> Result<DeploymentPlan> {
        let registry = NetworkRegistry::with_defaults(test_accounts());
        let declaration = declare(&FairLaunchModule::new())?;
        DeploymentPlan::new(&declaration, registry.resolve(network)?, artifacts_dir)
    }

    #[test]
    fn plan_without_artifacts_has_no_init_code() {
        let plan = plan_for("base-sepolia", None).unwrap();
        assert_eq!(plan.module_id, "FairLaunchToken");
        assert_eq!(plan.network.identifier, "base-sepolia");
        assert_eq!(plan.deployments.len(), 1);

        let token = plan.deployment(&plan.outputs[TOKEN_OUTPUT]).unwrap();
        assert!(token.init_code.is_none());
        assert_eq!(token.encoded_args.len(), 12 * 32);
        assert_eq!(token.fingerprint.len(), 64);
    }

    #[test]
    fn args_are_identical_across_networks() {
        let plans: Vec<_> = ["base-mainnet", "base-sepolia", "base-local"]
            .into_iter()
            .map(|n| plan_for(n, None).unwrap())
            .collect();
        for plan in &plans[1..] {
            assert_eq!(plan.deployments, plans[0].deployments);
            assert_eq!(plan.deployments[0].args.len(), 8);
        }
        assert_ne!(plans[0].network, plans[1].network);
    }

    #[test]
    fn repeated_planning_is_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        write_artifact(
            tmp.path(),
            "FairLaunchToken",
            fair_launch_abi("uint256"),
            BYTECODE,
        );

        let first = plan_for("base-local", Some(tmp.path())).unwrap();
        let second = plan_for("base-local", Some(tmp.path())).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
    }

    #[test]
    fn plan_with_artifacts_includes_init_code() {
        let tmp = tempfile::tempdir().unwrap();
        write_artifact(
            tmp.path(),
            "FairLaunchToken",
            fair_launch_abi("uint256"),
            BYTECODE,
        );

        let with = plan_for("base-local", Some(tmp.path())).unwrap();
        let without = plan_for("base-local", None).unwrap();
        let token = &with.deployments[0];
        let init_code = token.init_code.as_ref().unwrap();

        assert!(init_code.ends_with(&token.encoded_args));
        assert_eq!(token.encoded_args, without.deployments[0].encoded_args);
        assert_ne!(token.fingerprint, without.deployments[0].fingerprint);
    }

    #[test]
    fn mismatched_artifact_fails_planning() {
        let tmp = tempfile::tempdir().unwrap();
        let mut abi = fair_launch_abi("uint256");
        abi[0]["inputs"].as_array_mut().unwrap().truncate(7);
        write_artifact(tmp.path(), "FairLaunchToken", abi, BYTECODE);

        let err = plan_for("base-local", Some(tmp.path())).unwrap_err();
        assert!(matches!(err, LaunchError::ConstructorMismatch { .. }));
    }

    #[test]
    fn unknown_network_fails_before_planning() {
        let err = plan_for("unknown-network", None).unwrap_err();
        assert!(matches!(err, LaunchError::UnknownNetwork { .. }));
    }

    #[test]
    fn json_never_contains_mnemonic() {
        let json = plan_for("base-mainnet", None)
            .unwrap()
            .to_json_pretty()
            .unwrap();
        assert!(!json.contains("junk"));
        assert!(json.contains("\"rpc_url\": \"https://mainnet.base.org\""));
        assert!(json.contains("\"value\": \"UltraCoin\""));
    }
}
