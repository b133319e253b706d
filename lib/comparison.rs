use tracing::{debug, info, warn};

use crate::bytecode_verification::immutables::{
    ImmutableRegistry, POOL_INIT_CODE_HASH_CONTRACTS, REFERENCE_CONTRACTS,
    REFERENCE_POOL_INIT_CODE_HASH,
};
use crate::bytecode_verification::{compare_contract, locate_pool_init_code_hash};
use crate::bytecode_verification::{CompareBytecode, HashLocation};
use crate::deployment::Deployment;
use crate::types::{byte_len, is_empty_code, Side};
use crate::web3::CodeFetcher;

/// What became of one contract during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum ContractOutcome {
    NotDeployed,
    NoCode(Side),
    Compared(CompareBytecode),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractReport {
    pub name: String,
    pub deployed_address: Option<String>,
    pub reference_address: String,
    /// Raw sizes in bytes, before any normalization.
    pub deployed_size: Option<usize>,
    pub reference_size: Option<usize>,
    pub outcome: ContractOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashReport {
    pub name: String,
    pub result: Result<HashLocation, String>,
}

/// Compares every deployed contract against its canonical counterpart.
pub struct Comparison<'a> {
    deployment: &'a Deployment,
    deployed_immutables: ImmutableRegistry,
    reference_immutables: ImmutableRegistry,
}

impl<'a> Comparison<'a> {
    pub fn new(deployment: &'a Deployment) -> Self {
        Comparison {
            deployment,
            deployed_immutables: ImmutableRegistry::from_deployment(
                &deployment.addresses.contracts,
                &deployment.pool_init_code_hash,
            ),
            reference_immutables: ImmutableRegistry::reference(),
        }
    }

    pub fn deployed_immutables(&self) -> &ImmutableRegistry {
        &self.deployed_immutables
    }

    pub fn reference_immutables(&self) -> &ImmutableRegistry {
        &self.reference_immutables
    }

    /// Fetches both sides concurrently and compares them. Never fails: every
    /// problem ends up in the report's outcome.
    pub async fn compare_one(
        &self,
        name: &str,
        reference_address: &str,
        deployed_fetcher: &dyn CodeFetcher,
        reference_fetcher: &dyn CodeFetcher,
    ) -> ContractReport {
        let mut report = ContractReport {
            name: name.to_string(),
            deployed_address: None,
            reference_address: reference_address.to_string(),
            deployed_size: None,
            reference_size: None,
            outcome: ContractOutcome::NotDeployed,
        };

        let deployed_address = match self.deployment.addresses.deployed_address(name) {
            Some(address) => address.to_string(),
            None => {
                info!("{} is not deployed on {}", name, self.deployment.network);
                return report;
            }
        };
        report.deployed_address = Some(deployed_address.clone());

        let (deployed_code, reference_code) = tokio::join!(
            deployed_fetcher.get_code(&deployed_address),
            reference_fetcher.get_code(reference_address)
        );
        let (deployed_code, reference_code) = match (deployed_code, reference_code) {
            (Ok(d), Ok(r)) => (d, r),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Fetching code for {} failed: {}", name, e);
                report.outcome = ContractOutcome::Failed(e.to_string());
                return report;
            }
        };

        if is_empty_code(&deployed_code) {
            report.outcome = ContractOutcome::NoCode(Side::Deployed);
            return report;
        }
        if is_empty_code(&reference_code) {
            report.outcome = ContractOutcome::NoCode(Side::Reference);
            return report;
        }
        report.deployed_size = Some(byte_len(&deployed_code));
        report.reference_size = Some(byte_len(&reference_code));

        let result = compare_contract(
            name,
            &deployed_code,
            &reference_code,
            &self.deployed_immutables,
            &self.reference_immutables,
        );
        debug!(
            "{}: {} difference(s), size delta {}",
            name,
            result.differences.len(),
            result.size_delta_bytes
        );
        report.outcome = ContractOutcome::Compared(result);
        report
    }

    /// Runs [`Self::compare_one`] for every reference contract, in order.
    /// `on_done` is called after each contract.
    pub async fn run(
        &self,
        deployed_fetcher: &dyn CodeFetcher,
        reference_fetcher: &dyn CodeFetcher,
        mut on_done: impl FnMut(&ContractReport),
    ) -> Vec<ContractReport> {
        let mut reports = vec![];
        for (name, reference_address) in REFERENCE_CONTRACTS {
            let report = self
                .compare_one(name, reference_address, deployed_fetcher, reference_fetcher)
                .await;
            on_done(&report);
            reports.push(report);
        }
        reports
    }

    /// Checks which pool init code hash each deployed hash-embedding contract
    /// carries. Contracts that aren't deployed are left out.
    pub async fn verify_pool_init_code_hashes(
        &self,
        deployed_fetcher: &dyn CodeFetcher,
    ) -> Vec<HashReport> {
        let mut reports = vec![];
        for name in POOL_INIT_CODE_HASH_CONTRACTS {
            let address = match self.deployment.addresses.deployed_address(name) {
                Some(address) => address,
                None => continue,
            };
            let result = deployed_fetcher
                .get_code(address)
                .await
                .map(|code| {
                    locate_pool_init_code_hash(
                        &code,
                        &self.deployment.pool_init_code_hash,
                        REFERENCE_POOL_INIT_CODE_HASH,
                    )
                })
                .map_err(|e| e.to_string());
            reports.push(HashReport {
                name: name.to_string(),
                result,
            });
        }
        reports
    }
}
