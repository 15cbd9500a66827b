use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use ci_app::{AuthFlow, IntakeWizard};
use ci_infra::FileDraftStore;
use ci_net::AuthApiClient;
use ci_platform::create_default_token_store;

/// The assembled client core. Shared by every screen for the lifetime of
/// the process.
pub struct ClinIntakeApp {
    pub auth: Arc<AuthFlow>,
    pub wizard: Arc<IntakeWizard>,
}

impl ClinIntakeApp {
    /// Log out and discard the intake draft in one step. A half-filled
    /// form must not leak into the next operator's session.
    pub async fn logout(&self) {
        self.auth.logout().await;
        if let Err(err) = self.wizard.reset().await {
            log::warn!("draft cleanup on logout failed: {err:#}");
        }
    }
}

/// Assembles the token store, HTTP client, draft store and flows.
pub struct AppBuilder {
    base_url: String,
    data_dir: Option<PathBuf>,
}

impl AppBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            data_dir: None,
        }
    }

    /// Override the app data root (credential fallback files and the
    /// intake draft live here). Defaults to the platform data dir.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> Result<ClinIntakeApp> {
        let data_dir = match self.data_dir {
            Some(dir) => dir,
            None => dirs::data_dir()
                .context("platform data directory unavailable")?
                .join("ClinIntake"),
        };

        let tokens = create_default_token_store(data_dir.clone())
            .context("credential storage init failed")?;
        let api = Arc::new(AuthApiClient::new(self.base_url, tokens.clone()));
        let drafts = Arc::new(FileDraftStore::in_app_data_root(&data_dir));

        Ok(ClinIntakeApp {
            auth: Arc::new(AuthFlow::new(api.clone(), tokens)),
            wizard: Arc::new(IntakeWizard::new(drafts, api)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_against_a_temp_data_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = AppBuilder::new("http://127.0.0.1:9")
            .data_dir(dir.path())
            .build()
            .unwrap();
        assert!(!app.auth.is_authenticated());
        assert!(app.wizard.record().is_empty());
    }

    #[tokio::test]
    async fn logout_also_discards_the_draft() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = AppBuilder::new("http://127.0.0.1:9")
            .data_dir(dir.path())
            .build()
            .unwrap();

        let mut partial = serde_json::Map::new();
        partial.insert("leito".to_string(), serde_json::json!("3B"));
        app.wizard.set_data(partial).await.unwrap();
        assert!(!app.wizard.record().is_empty());

        app.logout().await;
        assert!(app.wizard.record().is_empty());
    }
}
