//! Batch processing of independent site directories.
//!
//! The driver walks the immediate subdirectories of a sites root, sorted by
//! name, and normalizes each one's index document with fresh token state.
//! A directory that fails is recorded and logged; the batch keeps going.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{error, info};

use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::normalize::normalize_document;

/// What happened to one site directory.
#[derive(Debug)]
pub struct SiteOutcome {
    pub dir: PathBuf,
    pub result: Result<String, BatchError>,
}

/// Lists the site directories under `root`, sorted by name so batch order
/// does not depend on directory enumeration order.
pub async fn site_directories(root: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let scan_err = |source| BatchError::ScanRoot {
        path: root.to_path_buf(),
        source,
    };
    let mut entries = tokio::fs::read_dir(root).await.map_err(scan_err)?;
    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(scan_err)? {
        let path = entry.path();
        // metadata() follows symlinks, so a linked site directory counts.
        let meta = tokio::fs::metadata(&path).await.map_err(scan_err)?;
        if meta.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Normalizes the index document of one site directory with fresh state.
pub async fn normalize_site_dir(dir: &Path, cfg: &BatchConfig) -> Result<String, BatchError> {
    let index_path = dir.join(&cfg.index_file);
    let html = tokio::fs::read_to_string(&index_path)
        .await
        .map_err(|source| BatchError::ReadDocument {
            path: index_path,
            source,
        })?;
    let normalized = normalize_document(&html, dir, &cfg.normalize).await?;
    Ok(normalized)
}

/// Processes every site directory under the configured root, strictly in
/// order. Failures are captured per directory; only a root scan failure or
/// an invalid config ends the batch early.
pub async fn run_batch(cfg: &BatchConfig) -> Result<Vec<SiteOutcome>, BatchError> {
    cfg.validate()?;
    let dirs = site_directories(&cfg.sites_dir).await?;
    info!(root = %cfg.sites_dir.display(), sites = dirs.len(), "starting batch");

    let mut outcomes = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let start = Instant::now();
        let result = normalize_site_dir(&dir, cfg).await;
        let elapsed_micros = start.elapsed().as_micros();
        match &result {
            Ok(html) => {
                info!(dir = %dir.display(), bytes = html.len(), elapsed_micros, "site normalized");
            }
            Err(err) => {
                error!(dir = %dir.display(), error = %err, elapsed_micros, "site failed");
            }
        }
        outcomes.push(SiteOutcome { dir, result });
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site(root: &TempDir, name: &str, index: &str, assets: &[(&str, &str)]) -> PathBuf {
        let dir = root.path().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), index).unwrap();
        for (file, content) in assets {
            std::fs::write(dir.join(file), content).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn directories_are_listed_sorted() {
        let root = tempfile::tempdir().unwrap();
        site(&root, "zeta", "<html></html>", &[]);
        site(&root, "alpha", "<html></html>", &[]);
        std::fs::write(root.path().join("stray.txt"), "not a site").unwrap();

        let dirs = site_directories(root.path()).await.unwrap();
        let names: Vec<_> = dirs
            .iter()
            .filter_map(|d| d.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn missing_root_is_a_scan_error() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("nope");
        let err = site_directories(&missing).await.unwrap_err();
        assert!(matches!(err, BatchError::ScanRoot { .. }));
    }

    #[tokio::test]
    async fn missing_index_is_a_read_error() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("empty-site");
        std::fs::create_dir_all(&dir).unwrap();
        let err = normalize_site_dir(&dir, &BatchConfig::default())
            .await
            .unwrap_err();
        match err {
            BatchError::ReadDocument { path, .. } => assert!(path.ends_with("index.html")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn custom_index_file_is_used() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("site");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("home.html"), "<html><body>hi</body></html>").unwrap();

        let cfg = BatchConfig {
            index_file: "home.html".to_string(),
            ..BatchConfig::default()
        };
        let html = normalize_site_dir(&dir, &cfg).await.unwrap();
        assert_eq!(html, "<html><body>hi</body></html>");
    }
}
