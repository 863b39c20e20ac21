//! Committee directory configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DirectoryConfig {
    /// TOML roster mapping enrollments to course sections and advisors, and
    /// sections to committee members.
    #[serde(default)]
    pub roster_path: String,
}

impl DirectoryConfig {
    /// Check if a roster file has been configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.roster_path.is_empty()
    }

    #[must_use]
    pub fn roster_path(&self) -> Option<PathBuf> {
        self.is_configured().then(|| PathBuf::from(&self.roster_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = DirectoryConfig::default();
        assert!(!config.is_configured());
        assert!(config.roster_path().is_none());
    }

    #[test]
    fn configured_path() {
        let config = DirectoryConfig {
            roster_path: "roster.toml".into(),
        };
        assert_eq!(config.roster_path(), Some(PathBuf::from("roster.toml")));
    }
}
