#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;
    use bcv_libs::bytecode_verification::immutables::{
        DEFAULT_POOL_INIT_CODE_HASH, DEFAULT_WETH9, REFERENCE_CONTRACTS,
        REFERENCE_POOL_INIT_CODE_HASH,
    };
    use bcv_libs::bytecode_verification::HashLocation;
    use bcv_libs::comparison::{Comparison, ContractOutcome, ContractReport};
    use bcv_libs::deployment::{Deployment, DeploymentAddresses, Network};
    use bcv_libs::errors::ValidationError;
    use bcv_libs::types::Side;
    use bcv_libs::web3::{CodeFetcher, StaticCodeFetcher};

    const TRAILER_A: &str = "a2646970667358221220aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa64736f6c63430007060033";
    const TRAILER_B: &str = "a2646970667358221220bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb64736f6c63430007060033";

    const FACTORY: &str = "0x1111111111111111111111111111111111111111";
    const QUOTER: &str = "0x3333333333333333333333333333333333333333";
    const TICK_LENS: &str = "0x4444444444444444444444444444444444444444";
    const SWAP_ROUTER: &str = "0x5555555555555555555555555555555555555555";
    const MIGRATOR: &str = "0x6666666666666666666666666666666666666666";

    const REFERENCE_FACTORY: &str = "1f98431c8ad98523631ae4a59f267346ea31f984";
    const REFERENCE_WETH9: &str = "c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn reference_address(name: &str) -> &'static str {
        REFERENCE_CONTRACTS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, address)| *address)
            .unwrap()
    }

    fn deployment() -> Deployment {
        let contracts = BTreeMap::from([
            ("UniswapV3Factory".to_string(), FACTORY.to_string()),
            ("QuoterV2".to_string(), QUOTER.to_string()),
            ("TickLens".to_string(), TICK_LENS.to_string()),
            ("SwapRouter02".to_string(), SWAP_ROUTER.to_string()),
            ("V3Migrator".to_string(), MIGRATOR.to_string()),
            ("UniversalRouter".to_string(), "TBA".to_string()),
        ]);
        Deployment {
            network: Network::Testnet,
            chain_id: 6343,
            rpc_url: "http://127.0.0.1:1".to_string(),
            addresses: DeploymentAddresses {
                contracts,
                ..Default::default()
            },
            pool_init_code_hash: DEFAULT_POOL_INIT_CODE_HASH.to_string(),
        }
    }

    fn deployed_fetcher() -> StaticCodeFetcher {
        StaticCodeFetcher::new()
            .with_code(
                FACTORY,
                &format!("0x608060405273{}00{}", &FACTORY[2..], TRAILER_A),
            )
            .with_code(
                QUOTER,
                &format!(
                    "0x608060{}{}{}01{}",
                    &FACTORY[2..],
                    DEFAULT_WETH9,
                    DEFAULT_POOL_INIT_CODE_HASH,
                    TRAILER_A
                ),
            )
            .with_code(
                SWAP_ROUTER,
                &format!("0x6080{}{}", REFERENCE_POOL_INIT_CODE_HASH, TRAILER_A),
            )
            .with_code(MIGRATOR, "0x6080")
    }

    fn reference_fetcher() -> StaticCodeFetcher {
        StaticCodeFetcher::new()
            .with_code(
                reference_address("UniswapV3Factory"),
                &format!("0x608060405273{}00{}", REFERENCE_FACTORY, TRAILER_B),
            )
            .with_code(
                reference_address("QuoterV2"),
                &format!(
                    "0x608060{}{}{}02{}",
                    REFERENCE_FACTORY.to_uppercase(),
                    REFERENCE_WETH9,
                    REFERENCE_POOL_INIT_CODE_HASH,
                    TRAILER_B
                ),
            )
            .with_code(reference_address("TickLens"), "0x6080")
    }

    /// Fails for every address.
    struct BrokenFetcher;

    #[async_trait]
    impl CodeFetcher for BrokenFetcher {
        async fn get_code(&self, _address: &str) -> Result<String, ValidationError> {
            Err(ValidationError::Error("connection refused".to_string()))
        }
    }

    fn outcome<'a>(reports: &'a [ContractReport], name: &str) -> &'a ContractOutcome {
        &reports.iter().find(|r| r.name == name).unwrap().outcome
    }

    #[tokio::test]
    async fn test_run_reports_every_contract_in_order() {
        init();
        let deployment = deployment();
        let comparison = Comparison::new(&deployment);
        let mut seen = vec![];
        let reports = comparison
            .run(&deployed_fetcher(), &reference_fetcher(), |report| {
                seen.push(report.name.clone())
            })
            .await;

        let names: Vec<&str> = REFERENCE_CONTRACTS.iter().map(|(n, _)| *n).collect();
        assert_eq!(reports.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), names);
        assert_eq!(seen, names);
    }

    #[tokio::test]
    async fn test_run_outcomes() {
        init();
        let deployment = deployment();
        let comparison = Comparison::new(&deployment);
        let reports = comparison
            .run(&deployed_fetcher(), &reference_fetcher(), |_| {})
            .await;

        match outcome(&reports, "UniswapV3Factory") {
            ContractOutcome::Compared(result) => {
                assert!(result.identical);
                assert_eq!(result.size_delta_bytes, 0);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        let factory = reports.iter().find(|r| r.name == "UniswapV3Factory").unwrap();
        assert_eq!(factory.deployed_address.as_deref(), Some(FACTORY));
        assert_eq!(factory.deployed_size, Some(80));
        assert_eq!(factory.reference_size, Some(80));

        match outcome(&reports, "QuoterV2") {
            ContractOutcome::Compared(result) => {
                assert!(!result.identical);
                assert_eq!(result.differences.len(), 1);
                let diff = &result.differences[0];
                assert_eq!(diff.position, 75);
                assert_eq!(diff.deployed, "01");
                assert_eq!(diff.reference, "02");
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        assert_eq!(
            outcome(&reports, "TickLens"),
            &ContractOutcome::NoCode(Side::Deployed)
        );
        assert_eq!(
            outcome(&reports, "SwapRouter02"),
            &ContractOutcome::NoCode(Side::Reference)
        );
        assert_eq!(
            outcome(&reports, "UniversalRouter"),
            &ContractOutcome::NotDeployed
        );
        assert_eq!(outcome(&reports, "Multicall2"), &ContractOutcome::NotDeployed);
    }

    #[tokio::test]
    async fn test_fetch_failures_do_not_abort_the_run() {
        init();
        let deployment = deployment();
        let comparison = Comparison::new(&deployment);
        let reports = comparison
            .run(&BrokenFetcher, &reference_fetcher(), |_| {})
            .await;

        assert_eq!(reports.len(), REFERENCE_CONTRACTS.len());
        assert!(matches!(
            outcome(&reports, "UniswapV3Factory"),
            ContractOutcome::Failed(e) if e.contains("connection refused")
        ));
        assert!(matches!(
            outcome(&reports, "QuoterV2"),
            ContractOutcome::Failed(_)
        ));
        // no fetch happens for contracts that aren't deployed
        assert_eq!(outcome(&reports, "Multicall2"), &ContractOutcome::NotDeployed);
    }

    #[tokio::test]
    async fn test_verify_pool_init_code_hashes() {
        init();
        let deployment = deployment();
        let comparison = Comparison::new(&deployment);
        let reports = comparison
            .verify_pool_init_code_hashes(&deployed_fetcher())
            .await;

        // NonfungiblePositionManager, UniswapV3Staker and UniversalRouter aren't deployed
        let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["QuoterV2", "SwapRouter02"]);
        assert_eq!(
            reports[0].result,
            Ok(HashLocation::Found { byte_position: 43 })
        );
        assert_eq!(reports[1].result, Ok(HashLocation::ReferenceHashFound));

        let reports = comparison.verify_pool_init_code_hashes(&BrokenFetcher).await;
        assert!(reports.iter().all(|r| r.result.is_err()));
    }

    #[test]
    fn test_registries_follow_the_deployment() {
        let deployment = deployment();
        let comparison = Comparison::new(&deployment);
        assert_eq!(
            comparison.deployed_immutables().get("QuoterV2"),
            &[
                FACTORY[2..].to_string(),
                DEFAULT_WETH9.to_string(),
                DEFAULT_POOL_INIT_CODE_HASH.to_string()
            ]
        );
        assert_eq!(
            comparison.reference_immutables().get("QuoterV2")[0],
            REFERENCE_FACTORY
        );
        assert!(comparison.deployed_immutables().get("TickLens").is_empty());
    }
}
