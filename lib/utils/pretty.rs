use colored::Colorize;
use prettytable::Table;

use crate::bytecode_verification::immutables::{expected_difference, REFERENCE_POOL_INIT_CODE_HASH};
use crate::bytecode_verification::{CompareBytecode, DifferenceRecord, HashLocation};
use crate::comparison::{ContractOutcome, ContractReport, HashReport};
use crate::deployment::Deployment;

/// Differences shown per contract; the rest are only counted.
pub const MAX_REPORTED_DIFFERENCES: usize = 5;
const RULE_WIDTH: usize = 80;

pub fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn light_rule() -> String {
    "─".repeat(RULE_WIDTH)
}

pub fn format_difference(diff: &DifferenceRecord) -> String {
    format!(
        "{:>6}: 0x{} -> 0x{}",
        diff.position, diff.deployed, diff.reference
    )
}

/// Thousands-separated byte count.
pub fn format_size(bytes: usize) -> String {
    let digits = bytes.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn print_banner(deployment: &Deployment) {
    println!("{}", heavy_rule());
    println!(
        "BYTECODE COMPARISON: {} (chain {}) vs Uniswap V3 (Ethereum)",
        deployment.network, deployment.chain_id
    );
    println!("(With constructor args / immutables masked out)");
    println!("{}", heavy_rule());
    println!();
    println!(
        "Deployed POOL_INIT_CODE_HASH:  0x{}",
        deployment.pool_init_code_hash
    );
    println!(
        "Reference POOL_INIT_CODE_HASH: 0x{}",
        REFERENCE_POOL_INIT_CODE_HASH
    );
}

/// Lines describing a comparison result, without the contract header.
pub fn comparison_lines(contract_name: &str, result: &CompareBytecode) -> Vec<String> {
    let mut lines = vec![];
    if result.identical {
        lines.push(format!(
            "{} IDENTICAL - Logic bytecode matches",
            "[PASS]".green()
        ));
        return lines;
    }

    lines.push(format!(
        "{} {} byte(s) differ",
        "[FAIL]".red(),
        result.differences.len()
    ));
    if result.size_delta_bytes != 0 {
        lines.push(format!(
            "Size delta after normalization: {:+} byte(s)",
            result.size_delta_bytes
        ));
    }
    lines.push("First differences (position: deployed -> reference):".to_string());
    for diff in result.differences.iter().take(MAX_REPORTED_DIFFERENCES) {
        lines.push(format!("  {}", format_difference(diff)));
    }
    if result.differences.len() > MAX_REPORTED_DIFFERENCES {
        lines.push(format!(
            "  ... and {} more",
            result.differences.len() - MAX_REPORTED_DIFFERENCES
        ));
    }
    if let Some(note) = expected_difference(contract_name) {
        lines.push(format!("{} Expected difference: {}", "[NOTE]".cyan(), note));
    }
    lines
}

pub fn print_contract_report(report: &ContractReport, network: &str) {
    println!();
    println!("{}", light_rule());
    println!("[CONTRACT] {}", report.name.bold());

    let deployed_address = match &report.deployed_address {
        Some(address) => address,
        None => {
            println!("   {} Not deployed on {}", "[SKIP]".yellow(), network);
            return;
        }
    };
    println!("   Deployed:  {}", deployed_address);
    println!("   Reference: {}", report.reference_address);
    println!("{}", light_rule());

    match &report.outcome {
        ContractOutcome::NotDeployed => {}
        ContractOutcome::NoCode(side) => {
            println!("   {} {} contract has no code", "[WARN]".yellow(), side);
        }
        ContractOutcome::Failed(e) => {
            println!("   {} {}", "[ERROR]".red(), e);
        }
        ContractOutcome::Compared(result) => {
            if let (Some(d), Some(r)) = (report.deployed_size, report.reference_size) {
                println!("   Deployed size:  {} bytes", format_size(d));
                println!("   Reference size: {} bytes", format_size(r));
            }
            println!();
            println!("   [COMPARISON] (metadata stripped, immutables masked):");
            for line in comparison_lines(&report.name, result) {
                println!("      {}", line);
            }
        }
    }
}

pub fn print_hash_reports(reports: &[HashReport]) {
    println!();
    println!("{}", heavy_rule());
    println!("POOL_INIT_CODE_HASH VERIFICATION");
    println!("{}", heavy_rule());
    for report in reports {
        match &report.result {
            Ok(HashLocation::Found { byte_position }) => println!(
                "   {} {}: deployment hash found at byte {}",
                "[PASS]".green(),
                report.name,
                byte_position
            ),
            Ok(HashLocation::ReferenceHashFound) => println!(
                "   {} {}: WRONG! Reference hash found instead",
                "[FAIL]".red(),
                report.name
            ),
            Ok(HashLocation::Missing) => println!(
                "   {} {}: Neither hash found",
                "[WARN]".yellow(),
                report.name
            ),
            Err(e) => println!("   {} {}: {}", "[ERROR]".red(), report.name, e),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub identical: usize,
    pub differing: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub fn summarize(reports: &[ContractReport]) -> RunSummary {
    let mut summary = RunSummary::default();
    for report in reports {
        match &report.outcome {
            ContractOutcome::Compared(result) if result.identical => summary.identical += 1,
            ContractOutcome::Compared(_) => summary.differing += 1,
            ContractOutcome::NotDeployed => summary.skipped += 1,
            ContractOutcome::NoCode(_) | ContractOutcome::Failed(_) => summary.failed += 1,
        }
    }
    summary
}

fn status_cell(report: &ContractReport) -> String {
    match &report.outcome {
        ContractOutcome::Compared(result) if result.identical => "identical".green().to_string(),
        ContractOutcome::Compared(result) => {
            let text = format!("{} byte(s) differ", result.differences.len());
            if expected_difference(&report.name).is_some() {
                format!("{} (expected)", text).yellow().to_string()
            } else {
                text.red().to_string()
            }
        }
        ContractOutcome::NotDeployed => "not deployed".dimmed().to_string(),
        ContractOutcome::NoCode(side) => format!("no {} code", side).yellow().to_string(),
        ContractOutcome::Failed(_) => "error".red().to_string(),
    }
}

pub fn print_run_summary(reports: &[ContractReport]) {
    let mut table = Table::new();
    table.add_row(row!["Contract", "Status", "Size delta"]);
    for report in reports {
        let delta = match &report.outcome {
            ContractOutcome::Compared(result) => format!("{:+}", result.size_delta_bytes),
            _ => "-".to_string(),
        };
        table.add_row(row![report.name, status_cell(report), delta]);
    }
    let summary = summarize(reports);
    table.add_row(row![
        "Total",
        format!(
            "{} identical, {} differing, {} skipped, {} failed",
            summary.identical, summary.differing, summary.skipped, summary.failed
        ),
        ""
    ]);

    println!();
    table.printstd();
}
