use crate::error::Result;
use log::info;
use std::path::Path;

/// Write a job result verbatim to `path`, replacing whatever was there.
pub fn persist_result(path: impl AsRef<Path>, result: &str) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, result)?;
    info!(
        "Completed writing {} bytes to file: {}",
        result.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::persist_result;

    #[test]
    fn test_persist_writes_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hms-data.json");
        persist_result(&path, "X\n").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"X\n");
    }

    #[test]
    fn test_persist_overwrites_longer_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hms-data.json");
        std::fs::write(&path, "a much longer previous payload\n").unwrap();
        persist_result(&path, "{\"a\":1}\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"a\":1}\n");
    }

    #[test]
    fn test_persist_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("hms-data.json");
        assert!(persist_result(&path, "X\n").is_err());
    }
}
