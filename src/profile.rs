// CLASSIFICATION: COMMUNITY
// Filename: profile.rs v0.2
// Author: Lukas Bower
// Date Modified: 2027-08-09

//! Deployment profiles selecting the authority root and serviced records.
//!
//! Two variants exist in the field: container hosts resolve under
//! `/containers/` and answer credential-metadata queries, while plain
//! account hosts resolve under `/accounts/` and do not. Both are one
//! component configured differently.

use std::io;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::Deserialize;

use crate::ident::MIN_IDENTITY;

/// Environment variable naming a built-in profile or a JSON profile file.
pub const PROFILE_ENV: &str = "COHESIX_NSS_PROFILE";

/// Runtime configuration for the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    /// Authority root; one directory entry per managed identity.
    pub root: String,
    /// Identities below this value are never resolved here.
    #[serde(default = "default_min_identity")]
    pub min_identity: u32,
    /// Whether shadow (credential-metadata) lookups are serviced.
    #[serde(default)]
    pub serve_shadow: bool,
}

fn default_min_identity() -> u32 {
    MIN_IDENTITY
}

impl Profile {
    /// Container-host profile: `/containers/` root, shadow serviced.
    #[must_use]
    pub fn containers() -> Self {
        Self {
            root: "/containers/".into(),
            min_identity: MIN_IDENTITY,
            serve_shadow: true,
        }
    }

    /// Account-host profile: `/accounts/` root, no shadow records.
    #[must_use]
    pub fn accounts() -> Self {
        Self {
            root: "/accounts/".into(),
            min_identity: MIN_IDENTITY,
            serve_shadow: false,
        }
    }

    /// Load a profile from a JSON file containing `root`, `min_identity`
    /// and `serve_shadow`.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let txt = std::fs::read_to_string(path)?;
        Self::from_str(&txt).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Resolve the active profile from [`PROFILE_ENV`].
    ///
    /// The value may name a built-in profile or point at a JSON file; an
    /// unset or unreadable value falls back to the container-host profile.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var(PROFILE_ENV) {
            Ok(v) if v == "containers" => Self::containers(),
            Ok(v) if v == "accounts" => Self::accounts(),
            Ok(v) => Self::from_file(Path::new(&v)).unwrap_or_else(|e| {
                debug!("profile file {v} unusable ({e}), using containers");
                Self::containers()
            }),
            Err(_) => Self::containers(),
        }
    }

    // Path assembly concatenates directly, so the root must end in '/'.
    fn normalized(mut self) -> Self {
        if !self.root.ends_with('/') {
            self.root.push('/');
        }
        self
    }
}

impl FromStr for Profile {
    type Err = serde_json::Error;

    /// Parse a profile from a JSON string.
    fn from_str(data: &str) -> Result<Self, Self::Err> {
        serde_json::from_str::<Self>(data).map(Self::normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles_differ_in_root_and_shadow() {
        let containers = Profile::containers();
        let accounts = Profile::accounts();
        assert_eq!(containers.root, "/containers/");
        assert!(containers.serve_shadow);
        assert_eq!(accounts.root, "/accounts/");
        assert!(!accounts.serve_shadow);
        assert_eq!(containers.min_identity, accounts.min_identity);
    }

    #[test]
    fn json_profile_fills_defaults_and_normalizes_root() {
        let profile: Profile = r#"{"root": "/srv/ident"}"#.parse().unwrap();
        assert_eq!(profile.root, "/srv/ident/");
        assert_eq!(profile.min_identity, MIN_IDENTITY);
        assert!(!profile.serve_shadow);
    }

    #[test]
    fn json_profile_overrides_are_honored() {
        let profile: Profile =
            r#"{"root": "/containers/", "min_identity": 40000, "serve_shadow": true}"#
                .parse()
                .unwrap();
        assert_eq!(profile.min_identity, 40_000);
        assert!(profile.serve_shadow);
    }
}
