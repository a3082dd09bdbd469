use crate::error::{Result, ScrapeError};
use crate::results::OrderId;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding one receipt file per order.
///
/// A receipt is never refreshed: the presence of its file is the only record
/// that an order has been handled.
#[derive(Debug, Clone)]
pub struct ReceiptStore {
    dir: PathBuf,
}

impl ReceiptStore {
    /// Use an existing directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(ScrapeError::ReceiptsDirMissing(dir));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, order_id: &OrderId) -> PathBuf {
        self.dir.join(order_id.as_str())
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.path_for(order_id).exists()
    }

    /// Write the receipt markup verbatim
    pub fn save(&self, order_id: &OrderId, markup: &str) -> Result<PathBuf> {
        let path = self.path_for(order_id);
        fs::write(&path, markup).map_err(|source| ScrapeError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            ReceiptStore::open(&missing),
            Err(ScrapeError::ReceiptsDirMissing(p)) if p == missing
        ));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("receipts");
        fs::write(&file, "").unwrap();
        assert!(ReceiptStore::open(&file).is_err());
    }

    #[test]
    fn test_save_names_file_after_order() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ReceiptStore::open(tmp.path()).unwrap();
        let id = OrderId::new("111-1602829-9424211").unwrap();

        assert!(!store.contains(&id));
        let path = store.save(&id, "<html>111-1602829-9424211</html>").unwrap();

        assert_eq!(path, tmp.path().join("111-1602829-9424211"));
        assert!(store.contains(&id));
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "<html>111-1602829-9424211</html>"
        );
    }
}
