//! Common test utilities and helpers

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use sitesync::config::{ConfigLoader, SyncConfig};
use sitesync::interaction::ScriptedPrompter;
use sitesync::orchestrator::Orchestrator;
use sitesync::registry::EnvironmentRegistry;
use sitesync::subprocess::{MockProcessRunner, SubprocessManager};

pub const TWO_ENVIRONMENTS: &str = r#"
environments:
  local:
    domain: http://dev.local
  staging:
    ssh: staging
    root: /var/www/site
    domain: https://staging.example.com/
    permissions:
      uploads: { pull: false }
"#;

pub const THREE_ENVIRONMENTS: &str = r#"
environments:
  local:
    domain: http://dev.local
  staging:
    ssh: staging
    root: /var/www/site
    domain: https://staging.example.com/
  production:
    ssh: prod
    root: /var/www/site
    domain: https://www.example.com
"#;

/// A scratch site directory holding a configuration file
pub struct TestSite {
    pub dir: TempDir,
    pub config: SyncConfig,
    pub registry: EnvironmentRegistry,
}

impl TestSite {
    pub async fn new(yaml: &str) -> Result<Self> {
        let dir = TempDir::new()?;
        let path = dir.path().join("sitesync.yml");
        fs::write(&path, yaml)?;
        let config = ConfigLoader::load(&path).await?;
        let registry = EnvironmentRegistry::from_config(&config)?;
        Ok(Self {
            dir,
            config,
            registry,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a local content directory such as `wp-content/themes`
    pub fn with_content_dir(self, name: &str) -> Result<Self> {
        fs::create_dir_all(self.path().join("wp-content").join(name))?;
        Ok(self)
    }

    pub fn orchestrator(
        &self,
        runner: &MockProcessRunner,
        prompter: &ScriptedPrompter,
        dry_run: bool,
    ) -> Orchestrator<'_> {
        Orchestrator::new(
            &self.config,
            &self.registry,
            SubprocessManager::new(Arc::new(runner.clone())).with_dry_run(dry_run),
            Arc::new(prompter.clone()),
        )
    }

    /// Files directly inside `<backup-root>/<sub>`, sorted
    pub fn dumps_in(&self, sub: &str) -> Vec<PathBuf> {
        let dir = self.config.backup_root().join(sub);
        let mut files: Vec<PathBuf> = match fs::read_dir(&dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        };
        files.sort();
        files
    }

    pub fn log_contents(&self) -> String {
        fs::read_to_string(self.config.log_path()).unwrap_or_default()
    }
}
