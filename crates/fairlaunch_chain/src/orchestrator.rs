use std::path::PathBuf;

use async_trait::async_trait;
use fairlaunch_core::{BoxError, LaunchError, Result};
use serde::Serialize;
use tracing::{error, info};

use crate::accounts::{AccountSource, AccountsSummary};
use crate::plan::DeploymentPlan;

/// Receipt from an orchestrator that accepted a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub module_id: String,
    pub network: String,
    /// Where the orchestrator recorded the plan (file path, job id, ...).
    pub location: String,
}

/// An engine that turns a [`DeploymentPlan`] into on-chain contracts.
///
/// Signing, broadcasting and confirming transactions all happen behind
/// this trait.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    fn name(&self) -> &str;

    async fn submit(
        &self,
        plan: &DeploymentPlan,
        accounts: &AccountSource,
    ) -> std::result::Result<Submission, BoxError>;
}

/// Hand `plan` to `orchestrator`. Failures come back unchanged inside
/// [`LaunchError::Deployment`]; nothing is retried.
pub async fn run(
    orchestrator: &dyn Orchestrator,
    plan: &DeploymentPlan,
    accounts: &AccountSource,
) -> Result<Submission> {
    info!(
        orchestrator = orchestrator.name(),
        module = %plan.module_id,
        network = %plan.network.identifier,
        "submitting deployment plan"
    );
    match orchestrator.submit(plan, accounts).await {
        Ok(submission) => {
            info!(location = %submission.location, "deployment plan accepted");
            Ok(submission)
        }
        Err(source) => {
            error!(orchestrator = orchestrator.name(), error = %source, "deployment failed");
            Err(LaunchError::Deployment {
                module: plan.module_id.clone(),
                source,
            })
        }
    }
}

#[derive(Serialize)]
struct ExportedPlan<'a> {
    compiler: &'a str,
    accounts: AccountsSummary,
    plan: &'a DeploymentPlan,
}

/// Writes plans to `<out_dir>/<network>/<module_id>.json` for an external
/// deployment engine to pick up.
#[derive(Debug, Clone)]
pub struct PlanExporter {
    out_dir: PathBuf,
    compiler: String,
}

impl PlanExporter {
    pub fn new(out_dir: impl Into<PathBuf>, compiler: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            compiler: compiler.into(),
        }
    }

    pub fn path_for(&self, plan: &DeploymentPlan) -> PathBuf {
        self.out_dir
            .join(&plan.network.identifier)
            .join(format!("{}.json", plan.module_id))
    }
}

#[async_trait]
impl Orchestrator for PlanExporter {
    fn name(&self) -> &str {
        "plan-exporter"
    }

    async fn submit(
        &self,
        plan: &DeploymentPlan,
        accounts: &AccountSource,
    ) -> std::result::Result<Submission, BoxError> {
        let path = self.path_for(plan);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let exported = ExportedPlan {
            compiler: &self.compiler,
            accounts: accounts.summary(),
            plan,
        };
        let json = serde_json::to_string_pretty(&exported)?;
        tokio::fs::write(&path, json).await?;

        Ok(Submission {
            module_id: plan.module_id.clone(),
            network: plan.network.identifier.clone(),
            location: path.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::tests::test_accounts;
    use crate::fair_launch::FairLaunchModule;
    use crate::module::declare;
    use crate::networks::NetworkRegistry;

    fn sepolia_plan() -> (AccountSource, DeploymentPlan) {
        let accounts = test_accounts();
        let registry = NetworkRegistry::with_defaults(accounts.clone());
        let declaration = declare(&FairLaunchModule::new()).unwrap();
        let plan =
            DeploymentPlan::new(&declaration, registry.resolve("base-sepolia").unwrap(), None)
                .unwrap();
        (accounts, plan)
    }

    struct RejectingOrchestrator;

    #[async_trait]
    impl Orchestrator for RejectingOrchestrator {
        fn name(&self) -> &str {
            "rejecting"
        }

        async fn submit(
            &self,
            _plan: &DeploymentPlan,
            _accounts: &AccountSource,
        ) -> std::result::Result<Submission, BoxError> {
            Err("insufficient funds for gas * price + value".into())
        }
    }

    #[tokio::test]
    async fn exporter_writes_plan_file() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = PlanExporter::new(tmp.path().join("deployments"), "0.8.24");
        let (accounts, plan) = sepolia_plan();

        let submission = run(&exporter, &plan, &accounts).await.unwrap();
        assert_eq!(submission.module_id, "FairLaunchToken");
        assert_eq!(submission.network, "base-sepolia");

        let path = exporter.path_for(&plan);
        assert!(path.ends_with("base-sepolia/FairLaunchToken.json"));
        assert_eq!(submission.location, path.display().to_string());

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["compiler"], "0.8.24");
        assert_eq!(written["accounts"]["source"], "env:WALLET_KEY");
        assert_eq!(written["plan"]["module_id"], "FairLaunchToken");
        assert_eq!(
            written["plan"]["deployments"][0]["args"]
                .as_array()
                .unwrap()
                .len(),
            8
        );
        assert!(!written.to_string().contains("junk"));
    }

    #[tokio::test]
    async fn exporter_overwrites_previous_plan() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = PlanExporter::new(tmp.path(), "0.8.24");
        let (accounts, plan) = sepolia_plan();

        run(&exporter, &plan, &accounts).await.unwrap();
        let first = std::fs::read_to_string(exporter.path_for(&plan)).unwrap();
        run(&exporter, &plan, &accounts).await.unwrap();
        let second = std::fs::read_to_string(exporter.path_for(&plan)).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn orchestrator_failure_is_propagated_unchanged() {
        let (accounts, plan) = sepolia_plan();
        let err = run(&RejectingOrchestrator, &plan, &accounts)
            .await
            .unwrap_err();

        assert_eq!(
            err.category(),
            fairlaunch_core::ErrorCategory::DelegatedDeployment
        );
        match err {
            LaunchError::Deployment { module, source } => {
                assert_eq!(module, "FairLaunchToken");
                assert_eq!(source.to_string(), "insufficient funds for gas * price + value");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
