//! Argument contract of the CMS database client
//!
//! Local commands run directly in the local site root. Remote commands go
//! through [`RemoteShell`](crate::subprocess::RemoteShell) so every word is
//! quoted by the same function.

use std::path::Path;

use crate::config::SyncConfig;
use crate::error::{common, Result};
use crate::registry::{Environment, Location};
use crate::subprocess::{ProcessCommand, ProcessCommandBuilder};

/// Flags shared by every search-replace invocation
#[derive(Debug, Clone, Default)]
pub struct SearchReplaceOptions {
    pub skip_columns: Vec<String>,
    /// Multi-site installs rewrite every site in the network
    pub network: bool,
}

impl SearchReplaceOptions {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            skip_columns: config.skip_columns.clone(),
            network: config.multisite,
        }
    }

    fn push_flags(&self, words: &mut Vec<String>) {
        words.extend(
            ["--all-tables", "--precise", "--recurse-objects"]
                .into_iter()
                .map(String::from),
        );
        if !self.skip_columns.is_empty() {
            words.push(format!("--skip-columns={}", self.skip_columns.join(",")));
        }
        if self.network {
            words.push("--network".to_string());
        }
    }
}

pub struct DatabaseClient<'a> {
    environment: &'a Environment,
    options: &'a SearchReplaceOptions,
}

impl<'a> DatabaseClient<'a> {
    pub fn new(environment: &'a Environment, options: &'a SearchReplaceOptions) -> Self {
        Self {
            environment,
            options,
        }
    }

    fn builder(&self, subcommand: &[&str]) -> Result<ProcessCommandBuilder> {
        let mut words = self.environment.db_client.clone();
        words.extend(subcommand.iter().map(|w| w.to_string()));
        self.builder_for(words)
    }

    fn builder_for(&self, words: Vec<String>) -> Result<ProcessCommandBuilder> {
        match &self.environment.location {
            Location::Remote { shell, .. } => Ok(shell.command(&words)),
            Location::Local { root } => {
                let (program, args) = words.split_first().ok_or_else(|| {
                    common::missing_required_field(&self.environment.name, "db_client")
                })?;
                Ok(ProcessCommandBuilder::new(program)
                    .args(args)
                    .current_dir(root))
            }
        }
    }

    /// Export the database to stdout
    pub fn export(&self) -> Result<ProcessCommand> {
        Ok(self.builder(&["db", "export", "-"])?.build())
    }

    /// Export the database into a new file
    pub fn export_to(&self, path: &Path) -> Result<ProcessCommand> {
        Ok(self
            .builder(&["db", "export", "-"])?
            .stdout_to_file(path)
            .build())
    }

    /// Import a dump read from stdin
    pub fn import(&self) -> Result<ProcessCommand> {
        Ok(self.builder(&["db", "import", "-"])?.build())
    }

    fn search_replace_words(&self, from: &str, to: &str) -> Vec<String> {
        let mut words = self.environment.db_client.clone();
        words.extend(["search-replace", from, to].into_iter().map(String::from));
        self.options.push_flags(&mut words);
        words
    }

    /// Rewrite `from` to `to` in place, table-wide
    pub fn search_replace(&self, from: &str, to: &str) -> Result<ProcessCommand> {
        Ok(self
            .builder_for(self.search_replace_words(from, to))?
            .inherit_output()
            .build())
    }

    /// Write a rewritten export to `path` without touching the database
    pub fn search_replace_export_to(
        &self,
        from: &str,
        to: &str,
        path: &Path,
    ) -> Result<ProcessCommand> {
        let mut words = self.search_replace_words(from, to);
        words.push("--export".to_string());
        Ok(self.builder_for(words)?.stdout_to_file(path).build())
    }
}
