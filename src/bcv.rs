use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::exit;

use bcv_libs::bytecode_verification::immutables::{
    expected_difference, DEFAULT_POOL_INIT_CODE_HASH, REFERENCE_CONTRACTS,
};
use bcv_libs::bytecode_verification::{compare_contract, ImmutableRegistry};
use bcv_libs::comparison::Comparison;
use bcv_libs::config::{BcvConfig, ETHEREUM_CHAIN_ID};
use bcv_libs::deployment::{Deployment, DeploymentAddresses, Network};
use bcv_libs::errors::ValidationError;
use bcv_libs::types::strip_hex_prefix;
use bcv_libs::utils::pretty::{self, comparison_lines};
use bcv_libs::utils::read_write_file::read_bytecode_arg;
use bcv_libs::web3::RpcClient;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use colored::Colorize;
use indicatif::ProgressBar;
use semver::Version;
use tokio::runtime::Runtime;
use tracing::{debug, info};

pub const CURRENT_VERSION: Version = Version::new(0, 3, 0);

// Validator function
fn is_valid_dir(val: &str) -> Result<PathBuf, String> {
    let path = Path::new(val);
    if path.is_dir() {
        Ok(path.to_path_buf())
    } else {
        Err(String::from("The path provided is not a directory"))
    }
}

// Validator function
fn is_valid_32_byte_hex(val: &str) -> Result<String, String> {
    let raw = strip_hex_prefix(val);
    if raw.len() != 64 {
        return Err(format!("Argument {} needs to be 32 bytes long.", val));
    }
    hex::decode(raw).map_err(|e| format!("Argument {} is not hex: {}", val, e))?;
    Ok(raw.to_ascii_lowercase())
}

fn compare(config: &BcvConfig, matches: &ArgMatches) -> Result<(), ValidationError> {
    let network = *matches
        .get_one::<Network>("network")
        .ok_or_else(|| ValidationError::Invalid("No network given.".to_string()))?;
    let addresses_dir = matches
        .get_one::<PathBuf>("addresses-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));

    println!("Loading {} addresses...", network);
    let addresses = DeploymentAddresses::load(&addresses_dir, network)?;
    let deployment = Deployment::resolve(config, network, addresses)?;
    info!("Deployed RPC: {}", deployment.rpc_url);

    let deployed_client = RpcClient::new(&deployment.rpc_url, config.web3_timeout)?;
    let reference_client = RpcClient::for_chain(config, ETHEREUM_CHAIN_ID)?;
    let comparison = Comparison::new(&deployment);

    pretty::print_banner(&deployment);

    let rt = Runtime::new()?;
    if let Ok(chain_id) = rt.block_on(deployed_client.get_eth_chain_id()) {
        if chain_id != deployment.chain_id {
            println!(
                "{} RPC reports chain id {}, expected {}",
                "[WARN]".yellow(),
                chain_id,
                deployment.chain_id
            );
        }
    }

    let pb = ProgressBar::new(REFERENCE_CONTRACTS.len() as u64);
    let reports = rt.block_on(comparison.run(&deployed_client, &reference_client, |report| {
        debug!("Finished {}", report.name);
        pb.inc(1);
    }));
    pb.finish_and_clear();

    for report in &reports {
        pretty::print_contract_report(report, &network.to_string());
    }

    let hash_reports = rt.block_on(comparison.verify_pool_init_code_hashes(&deployed_client));
    pretty::print_hash_reports(&hash_reports);
    pretty::print_run_summary(&reports);

    println!();
    println!("{}", pretty::heavy_rule());
    println!("Comparison complete");
    println!("{}", pretty::heavy_rule());
    Ok(())
}

fn diff(matches: &ArgMatches) -> Result<(), ValidationError> {
    let deployed_code = read_bytecode_arg(
        matches
            .get_one::<String>("deployed")
            .ok_or_else(|| ValidationError::Invalid("No deployed bytecode given.".to_string()))?,
    )?;
    let reference_code = read_bytecode_arg(
        matches
            .get_one::<String>("reference")
            .ok_or_else(|| ValidationError::Invalid("No reference bytecode given.".to_string()))?,
    )?;
    let contract_name = matches
        .get_one::<String>("contract")
        .cloned()
        .unwrap_or_default();
    if !contract_name.is_empty() && !REFERENCE_CONTRACTS.iter().any(|(n, _)| *n == contract_name) {
        return Err(ValidationError::Invalid(format!(
            "Unknown contract {}.",
            contract_name
        )));
    }
    let pool_init_code_hash = matches
        .get_one::<String>("pool-init-code-hash")
        .cloned()
        .unwrap_or_else(|| DEFAULT_POOL_INIT_CODE_HASH.to_string());

    let contracts = match matches.get_one::<PathBuf>("addresses") {
        Some(path) => DeploymentAddresses::from_path(path)?.contracts,
        None => BTreeMap::new(),
    };
    let deployed_immutables = ImmutableRegistry::from_deployment(&contracts, &pool_init_code_hash);
    let reference_immutables = ImmutableRegistry::reference();

    let result = compare_contract(
        &contract_name,
        &deployed_code,
        &reference_code,
        &deployed_immutables,
        &reference_immutables,
    );

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for line in comparison_lines(&contract_name, &result) {
            println!("{}", line);
        }
    }

    if result.identical {
        Ok(())
    } else if expected_difference(&contract_name).is_some() && matches.get_flag("allow-expected") {
        Ok(())
    } else {
        Err(ValidationError::Invalid(format!(
            "{} byte(s) differ.",
            result.differences.len()
        )))
    }
}

fn process(matches: ArgMatches) -> Result<(), ValidationError> {
    match matches.subcommand() {
        Some(("compare", sub_m)) => {
            let config = BcvConfig::from_matches(&matches)?;
            compare(&config, sub_m)
        }
        Some(("diff", sub_m)) => diff(sub_m),
        _ => Err(ValidationError::Invalid(
            "No subcommand given. See --help.".to_string(),
        )),
    }
}

fn main() {
    let matches = Command::new("bcv")
        .version(CURRENT_VERSION.to_string())
        .about("Bytecode comparison of a Uniswap V3 fork against the canonical deployment")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help(format!(
                    "Path of config file or \"env\", default location: {}",
                    BcvConfig::default_path().display()
                ))
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("compare")
                .about("Compares every deployed contract against Uniswap V3 on Ethereum")
                .arg(
                    Arg::new("network")
                        .help("Deployment to compare")
                        .value_parser(value_parser!(Network))
                        .default_value("testnet")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("addresses-dir")
                        .long("addresses-dir")
                        .help("Folder containing addresses.json / mainnetAddresses.json")
                        .value_parser(is_valid_dir)
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("diff")
                .about("Compares two bytecodes offline")
                .arg(
                    Arg::new("deployed")
                        .long("deployed")
                        .help("Deployed bytecode, or @file")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("reference")
                        .long("reference")
                        .help("Reference bytecode, or @file")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("contract")
                        .long("contract")
                        .help("Contract name, selects immutables and normalization")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("addresses")
                        .long("addresses")
                        .help("Address file of the deployment, for its immutables")
                        .value_parser(value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("pool-init-code-hash")
                        .long("pool-init-code-hash")
                        .help("Pool init code hash of the deployment")
                        .value_parser(is_valid_32_byte_hex)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("allow-expected")
                        .long("allow-expected")
                        .help("Succeed on differences that are known and accepted")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the full comparison result as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    match matches.get_count("verbose") {
        0 => {} // Normal verbosity
        1 => {
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::INFO)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::DEBUG)
                .init();
        }
    };

    match process(matches) {
        Ok(()) => exit(0),
        Err(ValidationError::Error(e)) => {
            println!("{} {}", "Error occurred:".yellow(), e.yellow());
            exit(1);
        }
        Err(ValidationError::Invalid(e)) => {
            println!("{} {}", "Error. Comparison failed:".yellow(), e.yellow());
            exit(1);
        }
    };
}
