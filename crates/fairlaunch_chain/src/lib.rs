// FairLaunchToken deployment: networks, accounts, modules and plans.

pub mod accounts;
pub mod artifact;
pub mod fair_launch;
pub mod module;
pub mod networks;
pub mod orchestrator;
pub mod plan;

// Re-export primary types for convenient access.
pub use accounts::{AccountSource, AccountsSummary, Mnemonic};
pub use artifact::ContractArtifact;
pub use fair_launch::{FairLaunchModule, FairLaunchParams};
pub use module::{
    ArgValue, ContractDeployment, ContractFuture, DeploymentModule, ModuleBuilder,
    ModuleDeclaration, ModuleOutputs, declare,
};
pub use networks::{NetworkProfile, NetworkRegistry, NetworkSummary, validate_url};
pub use orchestrator::{Orchestrator, PlanExporter, Submission, run};
pub use plan::{DeploymentPlan, PlannedDeployment};

/// Serializes wei amounts as decimal strings.
pub(crate) mod serde_u128 {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }
}
