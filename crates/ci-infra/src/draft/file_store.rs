use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use ci_core::{intake::IntakeRecord, ports::DraftStorePort};

/// File-backed draft storage: one JSON object under a fixed path.
///
/// Writes go through a temp file + rename so the draft on disk is always
/// either the previous contents or the fully written new contents.
pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The conventional draft location under an app data root.
    pub fn in_app_data_root(app_data_root: &Path) -> Self {
        Self::new(app_data_root.join("intake_draft.json"))
    }

    fn dir(&self) -> Option<&Path> {
        self.path.parent()
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(dir) = self.dir() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create draft dir failed: {}", dir.display()))?;
        }
        Ok(())
    }

    async fn atomic_write(&self, content: &str) -> Result<()> {
        self.ensure_parent_dir().await?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("write temp draft failed: {}", tmp_path.display()))?;

        fs::rename(&tmp_path, &self.path).await.with_context(|| {
            format!(
                "rename temp draft to target failed: {} -> {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}

#[async_trait]
impl DraftStorePort for FileDraftStore {
    async fn load(&self) -> Result<Option<IntakeRecord>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => {
                let record: IntakeRecord = serde_json::from_str(&content)
                    .with_context(|| format!("parse draft failed: {}", self.path.display()))?;
                Ok(Some(record))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err)
                .with_context(|| format!("read draft failed: {}", self.path.display())),
        }
    }

    async fn save(&self, draft: &IntakeRecord) -> Result<()> {
        let content = serde_json::to_string_pretty(draft).context("serialize draft failed")?;
        self.atomic_write(&content).await
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("remove draft failed: {}", self.path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(pairs: &[(&str, serde_json::Value)]) -> IntakeRecord {
        let mut record = IntakeRecord::new();
        record.merge(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        );
        record
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileDraftStore::in_app_data_root(dir.path());

        let draft = record(&[("leito", json!("3B")), ("peso_kg", json!(70.5))]);
        store.save(&draft).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, draft);
    }

    #[tokio::test]
    async fn load_without_saved_draft_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileDraftStore::in_app_data_root(dir.path());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_creates_missing_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileDraftStore::new(dir.path().join("nested/deeper/intake_draft.json"));
        store.save(&record(&[("leito", json!("1A"))])).await.unwrap();
        assert!(store.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clear_removes_draft_and_is_idempotent() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileDraftStore::in_app_data_root(dir.path());
        store.save(&record(&[("leito", json!("3B"))])).await.unwrap();

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_draft_surfaces_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("intake_draft.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = FileDraftStore::new(path);
        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn no_temp_file_remains_after_save() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileDraftStore::in_app_data_root(dir.path());
        store.save(&record(&[("leito", json!("3B"))])).await.unwrap();
        assert!(!dir.path().join("intake_draft.json.tmp").exists());
    }
}
