use std::fs;
use std::path::PathBuf;

use crate::export::domain::file_offer::FileOffer;

/// Offers files by saving them into a directory.
pub struct DirectoryFileOffer {
    dir: PathBuf,
}

impl DirectoryFileOffer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileOffer for DirectoryFileOffer {
    fn offer(&self, bytes: &[u8], file_name: &str) -> Result<(), Box<dyn std::error::Error>> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes)?;
        log::info!("Saved {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_bytes_under_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let offer = DirectoryFileOffer::new(dir.path().join("shots"));

        offer.offer(b"png-bytes", "snapshot_1.png").unwrap();

        let written = fs::read(dir.path().join("shots").join("snapshot_1.png")).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[test]
    fn test_unwritable_directory_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let offer = DirectoryFileOffer::new(blocker.join("sub"));

        assert!(offer.offer(b"png", "snapshot_1.png").is_err());
    }
}
