//! Local repository configuration (§6, §10.3): a small JSON document at
//! `<store-root>/config` with typed accessors for the two recognized keys.
//!
//! Unlike the teacher's `config.rs` (a forked `git-config`/INI format with a
//! `Global`/`Local` scope chain resolved through `get!`/`get_opt!` macros),
//! this is a flat JSON object with no global scope: SPEC_FULL §10.3 names
//! exactly one config file per repository, env-then-default fallback only.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::lockfile::Filelock;
use crate::signature::{MISSING_IDENTITY_EMAIL, MISSING_IDENTITY_NAME};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    user: BTreeMap<String, String>,
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> anyhow::Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let text = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn user_name(&self) -> anyhow::Result<String> {
        Ok(self.load()?.user.get("name").cloned().unwrap_or_else(|| {
            std::env::var("GIT_AUTHOR_NAME").unwrap_or_else(|_| MISSING_IDENTITY_NAME.to_owned())
        }))
    }

    pub fn user_email(&self) -> anyhow::Result<String> {
        Ok(self.load()?.user.get("email").cloned().unwrap_or_else(|| {
            std::env::var("GIT_AUTHOR_EMAIL").unwrap_or_else(|_| MISSING_IDENTITY_EMAIL.to_owned())
        }))
    }

    pub fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let (section, field) = key
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("config key `{}` must be `section.field`", key))?;
        if section != "user" {
            anyhow::bail!("unrecognized config section `{}`", section);
        }
        let mut lock = Filelock::<Config>::lock(&self.path)?;
        lock.get_mut().user.insert(field.to_owned(), value.to_owned());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
