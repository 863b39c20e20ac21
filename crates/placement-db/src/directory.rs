//! Committee directory: who advises an enrollment and who sits on its committee.
//!
//! The engine only consumes the [`CommitteeDirectory`] trait. [`StaticDirectory`]
//! is an in-memory implementation that can be loaded from a TOML roster:
//!
//! ```toml
//! [enrollments.enr-1]
//! section = "sec-a"
//! advisor = "ins-advisor"
//!
//! [sections.sec-a]
//! committee = ["ins-1", "ins-2", "ins-3"]
//! ```

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Failed to read roster {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid roster: {0}")]
    Parse(#[from] toml::de::Error),

    /// The backing directory service failed.
    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// Lookups the workflow engine needs from the surrounding system.
#[async_trait]
pub trait CommitteeDirectory: Send + Sync {
    /// Course section the enrollment belongs to.
    async fn section_for_enrollment(
        &self,
        enrollment_id: &str,
    ) -> Result<Option<String>, DirectoryError>;

    /// Advisor assigned to the enrollment, if any.
    async fn assigned_advisor(&self, enrollment_id: &str) -> Result<Option<String>, DirectoryError>;

    /// Committee members of a course section. Empty when the section has none.
    async fn committee_members(&self, section_id: &str) -> Result<Vec<String>, DirectoryError>;
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EnrollmentEntry {
    section: Option<String>,
    advisor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SectionEntry {
    #[serde(default)]
    committee: Vec<String>,
}

/// In-memory directory, built programmatically or from a TOML roster.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticDirectory {
    #[serde(default)]
    enrollments: HashMap<String, EnrollmentEntry>,
    #[serde(default)]
    sections: HashMap<String, SectionEntry>,
}

impl StaticDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a roster from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Parse` for malformed TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, DirectoryError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a roster file.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Io` when the file cannot be read, or
    /// `DirectoryError::Parse` when it is not a valid roster.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let content = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Place an enrollment in a section, optionally with an assigned advisor.
    #[must_use]
    pub fn with_enrollment(
        mut self,
        enrollment_id: &str,
        section_id: &str,
        advisor_id: Option<&str>,
    ) -> Self {
        self.enrollments.insert(
            enrollment_id.to_string(),
            EnrollmentEntry {
                section: Some(section_id.to_string()),
                advisor: advisor_id.map(String::from),
            },
        );
        self
    }

    /// Set the committee for a section.
    #[must_use]
    pub fn with_committee<I, S>(mut self, section_id: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.insert(
            section_id.to_string(),
            SectionEntry {
                committee: members.into_iter().map(Into::into).collect(),
            },
        );
        self
    }
}

#[async_trait]
impl CommitteeDirectory for StaticDirectory {
    async fn section_for_enrollment(
        &self,
        enrollment_id: &str,
    ) -> Result<Option<String>, DirectoryError> {
        Ok(self
            .enrollments
            .get(enrollment_id)
            .and_then(|entry| entry.section.clone()))
    }

    async fn assigned_advisor(&self, enrollment_id: &str) -> Result<Option<String>, DirectoryError> {
        Ok(self
            .enrollments
            .get(enrollment_id)
            .and_then(|entry| entry.advisor.clone()))
    }

    async fn committee_members(&self, section_id: &str) -> Result<Vec<String>, DirectoryError> {
        Ok(self
            .sections
            .get(section_id)
            .map(|entry| entry.committee.clone())
            .unwrap_or_default())
    }
}
