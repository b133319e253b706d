use std::fs;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use crate::errors::ValidationError;

pub fn read_file(path: &Path) -> Result<String, ValidationError> {
    let mut file = File::open(path)?;
    let mut data = String::new();
    file.read_to_string(&mut data)?;

    Ok(data)
}

/// Writes pretty-printed JSON with a trailing newline, creating parent
/// directories as needed.
pub fn write_json(path: &Path, value: &serde_json::Value) -> Result<(), ValidationError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(serde_json::to_string_pretty(value)?.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Reads a bytecode argument: `@path` loads it from a file, anything else is
/// taken literally.
pub fn read_bytecode_arg(arg: &str) -> Result<String, ValidationError> {
    match arg.strip_prefix('@') {
        Some(path) => Ok(read_file(Path::new(path))?.trim().to_string()),
        None => Ok(arg.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_and_read_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("abis").join("Foo.json");
        write_json(&path, &json!([{"type": "function", "name": "foo"}])).unwrap();
        let content = read_file(&path).unwrap();
        assert!(content.ends_with("]\n"));
        assert!(content.contains("\"name\": \"foo\""));
    }

    #[test]
    fn test_read_bytecode_arg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("code.txt");
        fs::write(&path, "0x6080\n").unwrap();
        assert_eq!(
            read_bytecode_arg(&format!("@{}", path.display())).unwrap(),
            "0x6080"
        );
        assert_eq!(read_bytecode_arg(" 0x1234 ").unwrap(), "0x1234");
        assert!(read_bytecode_arg("@/nonexistent/code.txt").is_err());
    }
}
