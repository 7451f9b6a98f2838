//! Tree configuration loading and validation

use crate::error::{Result, TreeError};
use crate::propagation::PropagationPolicyKind;
use anyhow::Context;
use folio_acl::Principal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// Container tree configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TreeConfig {
    /// Role names whose grants are withheld below shared collections
    #[serde(default = "default_elevated_roles")]
    pub elevated_roles: BTreeSet<String>,

    /// ACL propagation applied by `move_item`
    #[serde(default)]
    pub move_policy: PropagationPolicyKind,

    /// Time-to-live of cached breadcrumb paths
    #[serde(default = "default_breadcrumb_ttl")]
    pub breadcrumb_cache_ttl_secs: u64,

    /// Run the full acyclicity check when a snapshot is loaded
    #[serde(default = "default_true")]
    pub verify_on_load: bool,
}

fn default_elevated_roles() -> BTreeSet<String> {
    ["ROLE_PI", "ROLE_LAB_ADMIN"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_breadcrumb_ttl() -> u64 { 60 }
fn default_true() -> bool { true }

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            elevated_roles: default_elevated_roles(),
            move_policy: PropagationPolicyKind::default(),
            breadcrumb_cache_ttl_secs: default_breadcrumb_ttl(),
            verify_on_load: true,
        }
    }
}

impl TreeConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .context("Failed to read configuration file")?;

        let config = Self::from_toml_str(&contents)
            .context("Failed to parse configuration file")?;

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| TreeError::Configuration(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.elevated_roles.iter().any(|r| r.trim().is_empty()) {
            return Err(TreeError::Configuration(
                "elevated role names cannot be empty".to_string(),
            ));
        }

        if self.breadcrumb_cache_ttl_secs == 0 {
            return Err(TreeError::Configuration(
                "breadcrumb_cache_ttl_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether `principal` is an elevated in-group role
    pub fn is_elevated(&self, principal: &Principal) -> bool {
        principal
            .role_name()
            .map(|name| self.elevated_roles.contains(name))
            .unwrap_or(false)
    }

    pub fn breadcrumb_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.breadcrumb_cache_ttl_secs)
    }
}
