#[cfg(test)]
mod tests {
    use std::fs;

    use assert_cmd::Command;
    use serde_json::Value;
    use tempfile::TempDir;

    const TRAILER_A: &str = "a2646970667358221220aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa64736f6c63430007060033";
    const TRAILER_B: &str = "a2646970667358221220bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb64736f6c63430007060033";

    const ADDRESSES: &str = r#"{
        "chainId": 6343,
        "chainName": "MegaETH Testnet",
        "contracts": {
            "UniswapV3Factory": "0x1111111111111111111111111111111111111111",
            "TickLens": "0x4444444444444444444444444444444444444444",
            "WETH9": "0x4200000000000000000000000000000000000006"
        }
    }"#;

    fn stdout(output: &std::process::Output) -> String {
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    #[test]
    fn test_diff_identical() {
        let assert = Command::cargo_bin("bcv")
            .unwrap()
            .args(["diff", "--deployed", "0x6080604052", "--reference", "0x6080604052"])
            .assert()
            .success();
        assert!(stdout(assert.get_output()).contains("IDENTICAL"));
    }

    #[test]
    fn test_diff_ignores_metadata() {
        let deployed = format!("0x6080604052{}", TRAILER_A);
        let reference = format!("0x6080604052{}", TRAILER_B);
        Command::cargo_bin("bcv")
            .unwrap()
            .args(["diff", "--deployed", &deployed, "--reference", &reference])
            .assert()
            .success();
    }

    #[test]
    fn test_diff_reports_differences() {
        let assert = Command::cargo_bin("bcv")
            .unwrap()
            .args(["diff", "--deployed", "0x1234", "--reference", "0x12ff"])
            .assert()
            .failure();
        let out = stdout(assert.get_output());
        assert!(out.contains("1 byte(s) differ"));
        assert!(out.contains("1: 0x34 -> 0xff"));
    }

    #[test]
    fn test_diff_json_output() {
        let assert = Command::cargo_bin("bcv")
            .unwrap()
            .args(["diff", "--deployed", "0x1234", "--reference", "0x1234", "--json"])
            .assert()
            .success();
        let result: Value = serde_json::from_str(&stdout(assert.get_output())).unwrap();
        assert_eq!(result["identical"], Value::Bool(true));
        assert_eq!(result["sizeDeltaBytes"], 0);
        assert_eq!(result["differences"], Value::Array(vec![]));
    }

    #[test]
    fn test_diff_masks_immutables_from_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let addresses_path = temp_dir.path().join("addresses.json");
        fs::write(&addresses_path, ADDRESSES).unwrap();
        let deployed_path = temp_dir.path().join("deployed.hex");
        fs::write(
            &deployed_path,
            format!(
                "0x608060405273{}00{}\n",
                "1111111111111111111111111111111111111111", TRAILER_A
            ),
        )
        .unwrap();
        let reference_path = temp_dir.path().join("reference.hex");
        fs::write(
            &reference_path,
            format!(
                "0x608060405273{}00{}\n",
                "1F98431c8aD98523631AE4a59f267346ea31F984", TRAILER_B
            ),
        )
        .unwrap();

        let deployed_arg = format!("@{}", deployed_path.display());
        let reference_arg = format!("@{}", reference_path.display());

        // without the contract name nothing is masked
        Command::cargo_bin("bcv")
            .unwrap()
            .args(["diff", "--deployed", &deployed_arg, "--reference", &reference_arg])
            .assert()
            .failure();

        Command::cargo_bin("bcv")
            .unwrap()
            .args([
                "diff",
                "--deployed",
                &deployed_arg,
                "--reference",
                &reference_arg,
                "--contract",
                "UniswapV3Factory",
                "--addresses",
                addresses_path.to_str().unwrap(),
            ])
            .assert()
            .success();
    }

    #[test]
    fn test_diff_rejects_bad_input() {
        Command::cargo_bin("bcv")
            .unwrap()
            .args([
                "diff",
                "--deployed",
                "0x00",
                "--reference",
                "0x00",
                "--contract",
                "NotAContract",
            ])
            .assert()
            .failure();
        Command::cargo_bin("bcv")
            .unwrap()
            .args([
                "diff",
                "--deployed",
                "0x00",
                "--reference",
                "0x00",
                "--pool-init-code-hash",
                "0x1234",
            ])
            .assert()
            .failure();
        Command::cargo_bin("bcv")
            .unwrap()
            .args(["diff", "--deployed", "@/nonexistent/code.hex", "--reference", "0x00"])
            .assert()
            .failure();
    }

    #[test]
    fn test_compare_without_address_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let assert = Command::cargo_bin("bcv")
            .unwrap()
            .args([
                "-c",
                "env",
                "compare",
                "testnet",
                "--addresses-dir",
                temp_dir.path().to_str().unwrap(),
            ])
            .assert()
            .failure();
        assert!(stdout(assert.get_output()).contains("not found"));
    }

    #[test]
    fn test_bcv_version() {
        let assert = Command::cargo_bin("bcv")
            .unwrap()
            .arg("--version")
            .assert()
            .success();
        assert_eq!(stdout(assert.get_output()).trim(), "bcv 0.3.0");
    }

    #[test]
    fn test_bcv_requires_subcommand() {
        Command::cargo_bin("bcv").unwrap().assert().failure();
        Command::cargo_bin("bcv")
            .unwrap()
            .arg("--help")
            .assert()
            .success();
    }

    fn abi_workspace() -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let deployment_dir = temp_dir.path().join("deployment");
        fs::create_dir_all(&deployment_dir).unwrap();
        fs::write(deployment_dir.join("addresses.json"), ADDRESSES).unwrap();

        let artifact = temp_dir
            .path()
            .join("v3-periphery/artifacts/contracts/lens/TickLens.sol/TickLens.json");
        fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        fs::write(
            &artifact,
            r#"{"contractName": "TickLens", "abi": [{"type": "function", "name": "getPopulatedTicksInWord"}]}"#,
        )
        .unwrap();
        temp_dir
    }

    #[test]
    fn test_fetch_abis_dry_run() {
        let temp_dir = abi_workspace();
        let deployment_dir = temp_dir.path().join("deployment");
        let assert = Command::cargo_bin("fetch-abis")
            .unwrap()
            .args([
                "-c",
                "env",
                "--dry-run",
                "--addresses-dir",
                deployment_dir.to_str().unwrap(),
                "--artifacts-root",
                temp_dir.path().to_str().unwrap(),
            ])
            .assert()
            .success();
        let out = stdout(assert.get_output());
        assert!(out.contains("Would write ABI from v3-periphery artifacts"));
        assert!(out.contains("proxy/library"));
        assert!(out.contains("Hint: For other contracts"));
        assert!(!deployment_dir.join("abis").exists());
    }

    #[test]
    fn test_fetch_abis_writes_files() {
        let temp_dir = abi_workspace();
        let deployment_dir = temp_dir.path().join("deployment");
        Command::cargo_bin("fetch-abis")
            .unwrap()
            .args([
                "-c",
                "env",
                "--addresses-dir",
                deployment_dir.to_str().unwrap(),
                "--artifacts-root",
                temp_dir.path().to_str().unwrap(),
            ])
            .assert()
            .success();

        let abis_dir = deployment_dir.join("abis");
        let abi: Value =
            serde_json::from_str(&fs::read_to_string(abis_dir.join("TickLens.json")).unwrap())
                .unwrap();
        assert_eq!(abi[0]["name"], "getPopulatedTicksInWord");
        assert!(!abis_dir.join("WETH9.json").exists());
        assert!(!abis_dir.join("UniswapV3Factory.json").exists());
    }
}
