use std::path::{Path, PathBuf};

use alloy_dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy_json_abi::{JsonAbi, Param};
use alloy_primitives::Bytes;
use fairlaunch_core::{LaunchError, Result};
use serde::Deserialize;
use tracing::debug;

use crate::module::ArgValue;

/// Compiled contract as written by Hardhat to
/// `artifacts/contracts/<Name>.sol/<Name>.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Path of the artifact for `contract_name` under `artifacts_dir`.
    pub fn path_for(artifacts_dir: &Path, contract_name: &str) -> PathBuf {
        artifacts_dir
            .join("contracts")
            .join(format!("{contract_name}.sol"))
            .join(format!("{contract_name}.json"))
    }

    pub fn load(artifacts_dir: &Path, contract_name: &str) -> Result<Self> {
        let path = Self::path_for(artifacts_dir, contract_name);
        let json = std::fs::read_to_string(&path).map_err(|e| LaunchError::Artifact {
            contract: contract_name.to_string(),
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        let artifact: Self = serde_json::from_str(&json).map_err(|e| LaunchError::Artifact {
            contract: contract_name.to_string(),
            reason: format!("malformed artifact {}: {e}", path.display()),
        })?;

        if artifact.contract_name != contract_name {
            return Err(LaunchError::Artifact {
                contract: contract_name.to_string(),
                reason: format!("artifact declares contract `{}`", artifact.contract_name),
            });
        }
        if artifact.bytecode.is_empty() {
            return Err(LaunchError::Artifact {
                contract: contract_name.to_string(),
                reason: "artifact has no creation bytecode (abstract contract or interface)".into(),
            });
        }
        debug!(
            contract = contract_name,
            source = %artifact.source_name,
            bytecode_len = artifact.bytecode.len(),
            "artifact loaded"
        );
        Ok(artifact)
    }

    pub fn constructor_inputs(&self) -> &[Param] {
        self.abi
            .constructor
            .as_ref()
            .map(|c| c.inputs.as_slice())
            .unwrap_or_default()
    }

    /// Match `args` against the constructor signature, returning values typed
    /// as the constructor declares them.
    pub fn check_args(&self, args: &[ArgValue]) -> Result<Vec<DynSolValue>> {
        let inputs = self.constructor_inputs();
        if inputs.len() != args.len() {
            return Err(self.mismatch(format!(
                "constructor takes {} arguments, {} given",
                inputs.len(),
                args.len()
            )));
        }

        inputs
            .iter()
            .zip(args)
            .enumerate()
            .map(|(i, (param, arg))| {
                let ty = param
                    .resolve()
                    .map_err(|e| self.mismatch(format!("argument {i}: {e}")))?;
                coerce(&ty, arg).ok_or_else(|| {
                    self.mismatch(format!(
                        "argument {i} ({}) expects {}, got {} `{arg}`",
                        param.name,
                        param.ty,
                        arg.sol_type()
                    ))
                })
            })
            .collect()
    }

    /// Creation code: bytecode followed by the ABI-encoded arguments.
    pub fn init_code(&self, args: &[ArgValue]) -> Result<Bytes> {
        let values = self.check_args(args)?;
        Ok(self.init_code_with(&encode_args(&values)))
    }

    /// Creation code for already encoded constructor parameters.
    pub fn init_code_with(&self, encoded_args: &[u8]) -> Bytes {
        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(encoded_args);
        Bytes::from(code)
    }

    fn mismatch(&self, reason: String) -> LaunchError {
        LaunchError::ConstructorMismatch {
            contract: self.contract_name.clone(),
            reason,
        }
    }
}

/// ABI-encode constructor values as a parameter list.
pub fn encode_args(values: &[DynSolValue]) -> Vec<u8> {
    DynSolValue::Tuple(values.to_vec()).abi_encode_params()
}

fn coerce(ty: &DynSolType, arg: &ArgValue) -> Option<DynSolValue> {
    match (ty, arg) {
        (DynSolType::Uint(bits), ArgValue::Uint(v)) if v.bit_len() <= *bits => {
            Some(DynSolValue::Uint(*v, *bits))
        }
        (DynSolType::Address, ArgValue::Address(a)) => Some(DynSolValue::Address(*a)),
        (DynSolType::String, ArgValue::String(s)) => Some(DynSolValue::String(s.clone())),
        _ => None,
    }
}
