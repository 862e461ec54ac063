//! Environment registry
//!
//! Built once from the validated configuration and read-only afterwards.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::{SyncConfig, TargetPermissions, LOCAL_ENVIRONMENT};
use crate::domain;
use crate::error::{common, ErrorCode, Result, SyncError};
use crate::subprocess::RemoteShell;
use crate::transfer::{Direction, SyncTarget};

/// Where an environment's files and database live
#[derive(Debug, Clone)]
pub enum Location {
    Local { root: PathBuf },
    Remote { shell: RemoteShell, root: String },
}

#[derive(Debug, Clone)]
pub struct Environment {
    pub name: String,
    pub location: Location,
    domain: Option<String>,
    /// Database-client invocation split into words
    pub db_client: Vec<String>,
    pub excludes: Vec<String>,
    permissions: BTreeMap<SyncTarget, TargetPermissions>,
}

impl Environment {
    pub fn is_local(&self) -> bool {
        matches!(self.location, Location::Local { .. })
    }

    /// Bare host used as the search/replace token for this environment
    pub fn host(&self) -> Result<String> {
        domain::host_token(&self.name, self.domain.as_deref())
    }

    /// Whether `target` may be transferred in `direction`; allowed unless denied
    pub fn allows(&self, target: SyncTarget, direction: Direction) -> bool {
        self.permissions
            .get(&target)
            .map_or(true, |perms| perms.allows(direction))
    }
}

#[derive(Debug, Clone)]
pub struct EnvironmentRegistry {
    environments: BTreeMap<String, Environment>,
}

impl EnvironmentRegistry {
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let mut environments = BTreeMap::new();

        for (name, env) in &config.environments {
            let client = env.db_client.as_deref().unwrap_or(&config.db_client);
            let db_client = shell_words::split(client).map_err(|e| {
                SyncError::config_with_code(
                    ErrorCode::CONFIG_INVALID_VALUE,
                    format!("Environment '{}' has an unparsable db_client", name),
                )
                .with_source(e)
            })?;

            let location = if name == LOCAL_ENVIRONMENT {
                Location::Local {
                    root: config.local_root(),
                }
            } else {
                let alias = env
                    .ssh
                    .clone()
                    .ok_or_else(|| common::missing_required_field(name, "ssh"))?;
                let root = env
                    .root
                    .clone()
                    .ok_or_else(|| common::missing_required_field(name, "root"))?;
                Location::Remote {
                    shell: RemoteShell::new(alias, root.clone()),
                    root,
                }
            };

            environments.insert(
                name.clone(),
                Environment {
                    name: name.clone(),
                    location,
                    domain: env.domain.clone(),
                    db_client,
                    excludes: env.exclude.clone(),
                    permissions: env.permissions.clone(),
                },
            );
        }

        Ok(Self { environments })
    }

    pub fn names(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.environments.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&Environment> {
        self.environments
            .get(name)
            .ok_or_else(|| common::unknown_environment(name, &self.names()))
    }

    pub fn local(&self) -> Result<&Environment> {
        self.get(LOCAL_ENVIRONMENT)
    }

    fn remote_names(&self) -> Vec<&str> {
        self.environments
            .values()
            .filter(|env| !env.is_local())
            .map(|env| env.name.as_str())
            .collect()
    }

    /// Decide which environment an operation targets.
    ///
    /// An explicit name must exist. Without one, a lone remote environment is
    /// chosen implicitly unless `require_explicit` is set.
    pub fn resolve(&self, explicit: Option<&str>, require_explicit: bool) -> Result<&Environment> {
        if let Some(name) = explicit {
            return self.get(name);
        }

        if require_explicit {
            return Err(SyncError::resolution(
                ErrorCode::RESOLUTION_ENVIRONMENT_REQUIRED,
                "This command requires an explicit environment (-e <name>)",
            ));
        }

        match self.remote_names().as_slice() {
            [] => Err(SyncError::resolution(
                ErrorCode::RESOLUTION_NO_REMOTE_ENVIRONMENTS,
                "No remote environments are configured",
            )),
            [only] => {
                tracing::debug!("Implicitly selected environment '{}'", only);
                self.get(only)
            }
            many => Err(SyncError::resolution(
                ErrorCode::RESOLUTION_AMBIGUOUS_ENVIRONMENT,
                format!(
                    "Multiple remote environments configured ({}); pass -e <name>",
                    many.join(", ")
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(yaml: &str) -> EnvironmentRegistry {
        let config: SyncConfig = serde_yaml::from_str(yaml).unwrap();
        EnvironmentRegistry::from_config(&config).unwrap()
    }

    const TWO: &str = r#"
environments:
  local:
    domain: http://dev.local
  staging:
    ssh: staging
    root: /srv/site
    domain: https://staging.example.com/
    db_client: wp --allow-root
    permissions:
      uploads: { pull: false }
"#;

    const THREE: &str = r#"
environments:
  local:
    domain: http://dev.local
  staging:
    ssh: staging
    root: /srv/site
    domain: https://staging.example.com
  production:
    ssh: prod
    root: /srv/site
    domain: https://example.com
"#;

    #[test]
    fn test_single_remote_resolves_implicitly() {
        let reg = registry(TWO);
        assert_eq!(reg.resolve(None, false).unwrap().name, "staging");
    }

    #[test]
    fn test_multiple_remotes_are_ambiguous() {
        let reg = registry(THREE);
        let err = reg.resolve(None, false).unwrap_err();
        assert_eq!(err.code(), ErrorCode::RESOLUTION_AMBIGUOUS_ENVIRONMENT);
    }

    #[test]
    fn test_no_remotes() {
        let reg = registry(
            r#"
environments:
  local:
    domain: http://dev.local
"#,
        );
        let err = reg.resolve(None, false).unwrap_err();
        assert_eq!(err.code(), ErrorCode::RESOLUTION_NO_REMOTE_ENVIRONMENTS);
    }

    #[test]
    fn test_require_explicit_never_guesses() {
        for yaml in [TWO, THREE] {
            let err = registry(yaml).resolve(None, true).unwrap_err();
            assert_eq!(err.code(), ErrorCode::RESOLUTION_ENVIRONMENT_REQUIRED);
        }
    }

    #[test]
    fn test_unknown_explicit_environment() {
        let err = registry(THREE).resolve(Some("qa"), false).unwrap_err();
        assert_eq!(err.code(), ErrorCode::RESOLUTION_UNKNOWN_ENVIRONMENT);
    }

    #[test]
    fn test_environment_details() {
        let reg = registry(TWO);
        let staging = reg.get("staging").unwrap();

        assert_eq!(staging.host().unwrap(), "staging.example.com");
        assert_eq!(staging.db_client, vec!["wp", "--allow-root"]);
        assert!(!staging.allows(SyncTarget::Uploads, Direction::Pull));
        assert!(staging.allows(SyncTarget::Uploads, Direction::Push));
        assert!(staging.allows(SyncTarget::Themes, Direction::Pull));
        assert!(reg.local().unwrap().is_local());
        assert_eq!(reg.local().unwrap().db_client, vec!["wp"]);
    }

    #[test]
    fn test_domain_without_host_is_a_config_error() {
        let reg = registry(
            r#"
environments:
  local:
    domain: http://dev.local
  staging:
    ssh: staging
    root: /srv/site
    domain: "https://"
"#,
        );
        let err = reg.get("staging").unwrap().host().unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
        assert!(err.to_string().contains("staging"));
    }
}
