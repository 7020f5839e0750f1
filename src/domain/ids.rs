//! Domain identifier types with validation
//!
//! Newtype wrappers for the DICOM identifiers nmdose passes around: the study
//! instance UID that keys a transfer, and the application entity titles that
//! name both ends of an association.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a UI value representation
const MAX_UID_LEN: usize = 64;

/// Maximum length of an AE value representation
const MAX_AE_TITLE_LEN: usize = 16;

/// Study Instance UID newtype wrapper
///
/// The entity identifier extracted from query responses and used to request a
/// transfer. Surrounding whitespace and NUL padding are removed on construction.
///
/// # Examples
///
/// ```
/// use nmdose::domain::ids::StudyInstanceUid;
/// use std::str::FromStr;
///
/// let uid = StudyInstanceUid::from_str("1.2.840.113619.2.55\0").unwrap();
/// assert_eq!(uid.as_str(), "1.2.840.113619.2.55");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudyInstanceUid(String);

impl StudyInstanceUid {
    /// Creates a new StudyInstanceUid
    ///
    /// Returns `Err` if the value is empty after trimming, longer than 64
    /// characters, or contains anything other than digits and dots.
    pub fn new(uid: impl Into<String>) -> Result<Self, String> {
        let uid = uid.into();
        let uid = uid.trim_matches(|c: char| c == '\0' || c.is_whitespace());
        if uid.is_empty() {
            return Err("Study Instance UID cannot be empty".to_string());
        }
        if uid.len() > MAX_UID_LEN {
            return Err(format!(
                "Study Instance UID exceeds {MAX_UID_LEN} characters: {uid}"
            ));
        }
        if !uid.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(format!("Invalid Study Instance UID: {uid}"));
        }
        Ok(Self(uid.to_string()))
    }

    /// Returns the UID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for StudyInstanceUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StudyInstanceUid {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for StudyInstanceUid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Application Entity title
///
/// # Examples
///
/// ```
/// use nmdose::domain::ids::AeTitle;
///
/// let aet = AeTitle::new("RESEARCH_SCU").unwrap();
/// assert_eq!(aet.as_str(), "RESEARCH_SCU");
/// assert!(AeTitle::new("THIS_TITLE_IS_TOO_LONG").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AeTitle(String);

impl AeTitle {
    /// Creates a new AeTitle
    pub fn new(title: impl Into<String>) -> Result<Self, String> {
        let title = title.into();
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err("AE title cannot be empty".to_string());
        }
        if trimmed.len() > MAX_AE_TITLE_LEN {
            return Err(format!(
                "AE title '{trimmed}' exceeds {MAX_AE_TITLE_LEN} characters"
            ));
        }
        if trimmed.chars().any(|c| c.is_control() || c == '\\') {
            return Err(format!("AE title '{trimmed}' contains invalid characters"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the title as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AeTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AeTitle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AeTitle {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AeTitle> for String {
    fn from(value: AeTitle) -> Self {
        value.0
    }
}
