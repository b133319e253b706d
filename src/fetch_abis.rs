use std::path::{Path, PathBuf};
use std::process::exit;

use bcv_libs::abi::{contracts_to_process, AbiFetcher, AbiResult, AbiStatus};
use bcv_libs::config::BcvConfig;
use bcv_libs::deployment::{DeploymentAddresses, Network};
use bcv_libs::errors::ValidationError;
use bcv_libs::utils::read_write_file::write_json;
use clap::{arg, command, value_parser, ArgAction, ArgMatches};
use colored::Colorize;
use tracing::debug;

const BUILD_HINTS: &[&str] = &[
    "cd ../v3-core && yarn compile",
    "cd ../v3-periphery && yarn compile",
    "cd ../swap-router-contracts && yarn compile",
    "cd ../v3-staker && yarn compile",
    "cd ../universal-router && forge build",
];

fn print_summary(results: &[AbiResult], etherscan_api_key: bool, abis_dir: &Path, dry_run: bool) {
    println!();
    println!("{}", "=".repeat(60));
    println!("Summary");
    println!();

    let fetched: Vec<&AbiResult> = results
        .iter()
        .filter(|r| matches!(r.status, AbiStatus::Fetched(_)))
        .collect();
    println!("Fetched: {}", fetched.len());
    for result in &fetched {
        if let AbiStatus::Fetched(source) = &result.status {
            println!("  - {} ({})", result.name, source);
        }
    }

    let skipped: Vec<&AbiResult> = results
        .iter()
        .filter(|r| r.status == AbiStatus::Skipped)
        .collect();
    if !skipped.is_empty() {
        println!("\nSkipped: {}", skipped.len());
        for result in &skipped {
            println!("  - {}", result.name);
        }
    }

    let failed: Vec<&AbiResult> = results
        .iter()
        .filter(|r| r.status == AbiStatus::Failed)
        .collect();
    if !failed.is_empty() {
        println!("\nFailed: {}", failed.len());
        for result in &failed {
            println!("  - {}", result.name);
        }
        if failed.iter().any(|r| r.name == "Permit2") && !etherscan_api_key {
            println!("\nHint: For Permit2, set ETHERSCAN_API_KEY env var (free at etherscan.io)");
            println!("  ETHERSCAN_API_KEY=your-key fetch-abis -c env");
        }
        println!("\nHint: For other contracts, run builds in the source repos:");
        for hint in BUILD_HINTS {
            println!("  {}", hint);
        }
    }

    if !dry_run {
        println!("\nABIs written to: {}", abis_dir.display());
    }
}

fn fetch_abis(matches: &ArgMatches) -> Result<(), ValidationError> {
    let config = BcvConfig::from_matches(matches)?;
    let dry_run = matches.get_flag("dry-run");
    let addresses_dir = matches
        .get_one::<PathBuf>("addresses-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    if dry_run {
        println!("{} No files will be written\n", "[DRY RUN]".cyan());
    }

    let addresses = DeploymentAddresses::load(&addresses_dir, Network::Testnet)?;
    println!(
        "Loading contracts from {} (Chain ID: {})",
        addresses.chain_name.as_deref().unwrap_or("unknown chain"),
        addresses
            .chain_id
            .unwrap_or_else(|| Network::Testnet.chain_id())
    );
    println!(
        "Explorer: {}\n",
        addresses.block_explorer.as_deref().unwrap_or("none")
    );

    // Source repos are expected next to the deployment folder by default.
    let artifacts_root = match matches.get_one::<PathBuf>("artifacts-root") {
        Some(root) => root.clone(),
        None => match &config.artifacts_root {
            Some(root) => root.clone(),
            None => addresses_dir
                .canonicalize()?
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("..")),
        },
    };
    debug!("Artifacts root: {}", artifacts_root.display());

    let abis_dir = addresses_dir.join("abis");
    let fetcher = AbiFetcher::new(
        &config,
        artifacts_root,
        addresses.block_explorer.clone(),
    )?;

    let mut results = vec![];
    for name in contracts_to_process(&addresses) {
        println!("\n{}", name.bold());
        let address = addresses.deployed_address(&name);
        if let Some(address) = address {
            println!("  Address: {}", address);
        }

        let (abi, status) = fetcher.resolve(&name, address);
        match (&abi, &status) {
            (_, AbiStatus::Skipped) => println!("  {} proxy/library", "[SKIP]".yellow()),
            (Some(abi), AbiStatus::Fetched(source)) => {
                if dry_run {
                    println!("  {} Would write ABI from {}", "[OK]".green(), source);
                } else {
                    write_json(&abis_dir.join(format!("{}.json", name)), abi)?;
                    println!("  {} Saved from {}", "[OK]".green(), source);
                }
            }
            _ => println!("  {} Could not fetch ABI", "[FAIL]".red()),
        }
        results.push(AbiResult { name, status });
    }

    print_summary(
        &results,
        config.etherscan_api_key.is_some(),
        &abis_dir,
        dry_run,
    );
    Ok(())
}

fn main() {
    let matches = command!()
        .about("Collects contract ABIs from build artifacts and block explorers")
        .arg(arg!(-c --config <FILE> "Path of config file or \"env\""))
        .arg(
            arg!(--"addresses-dir" <DIR> "Folder containing addresses.json")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"artifacts-root" <DIR> "Folder containing the source repos")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(arg!(--"dry-run" "Do not write any files").action(ArgAction::SetTrue))
        .arg(arg!(-v --verbose "Verbose mode").action(ArgAction::SetTrue))
        .get_matches();

    if matches.get_flag("verbose") {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }
    match fetch_abis(&matches) {
        Ok(()) => exit(0),
        Err(ValidationError::Error(e)) => {
            println!("{} {}", "Error occurred:".yellow(), e.yellow());
            exit(1);
        }
        Err(ValidationError::Invalid(e)) => {
            println!("{} {}", "Invalid input:".yellow(), e.yellow());
            exit(1);
        }
    }
}
