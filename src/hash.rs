//! Content digests for referenced asset files.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::NormalizeError;

/// Hashes text with SHA-256 and returns the lowercase hex digest.
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Reads the asset at `file_path` relative to `working_dir` and returns the
/// digest of its content. The digest stays inside the process; it is only
/// used to recognize byte-identical files.
pub async fn digest_file(working_dir: &Path, file_path: &str) -> Result<String, NormalizeError> {
    let path = resolve_asset_path(working_dir, file_path);
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| NormalizeError::FileRead { path, source })?;
    Ok(hash_text(&text))
}

/// Joins an asset URL path onto the site directory. A leading `/` marks a
/// site-root-relative path, so it is stripped before joining.
pub(crate) fn resolve_asset_path(working_dir: &Path, file_path: &str) -> PathBuf {
    working_dir.join(file_path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = hash_text("console.log('hi');");
        let b = hash_text("console.log('hi');");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_content() {
        assert_ne!(hash_text("a"), hash_text("b"));
    }

    #[test]
    fn empty_input_digest_is_known() {
        assert_eq!(
            hash_text(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn leading_slash_resolves_against_site_root() {
        let path = resolve_asset_path(Path::new("sites/alpha"), "/js/app.js");
        assert_eq!(path, Path::new("sites/alpha/js/app.js"));
    }

    #[tokio::test]
    async fn digest_file_matches_text_hash() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), "let x = 1;").unwrap();
        let digest = digest_file(dir.path(), "app.js").await.unwrap();
        assert_eq!(digest, hash_text("let x = 1;"));
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = digest_file(dir.path(), "ghost.js").await.unwrap_err();
        match err {
            NormalizeError::FileRead { path, .. } => {
                assert!(path.ends_with("ghost.js"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
