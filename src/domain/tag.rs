//! DICOM attribute tags
//!
//! A tag is the `(gggg,eeee)` pair printed by the protocol tools in front of
//! every attribute. Tags display in upper-case hex so that lookups are
//! independent of how the tool chose to print them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A DICOM attribute tag `(group,element)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DicomTag {
    group: u16,
    element: u16,
}

impl DicomTag {
    /// Specific Character Set
    pub const SPECIFIC_CHARACTER_SET: DicomTag = DicomTag::new(0x0008, 0x0005);
    /// Study Date
    pub const STUDY_DATE: DicomTag = DicomTag::new(0x0008, 0x0020);
    /// Study Time
    pub const STUDY_TIME: DicomTag = DicomTag::new(0x0008, 0x0030);
    /// Accession Number
    pub const ACCESSION_NUMBER: DicomTag = DicomTag::new(0x0008, 0x0050);
    /// Modalities in Study
    pub const MODALITIES_IN_STUDY: DicomTag = DicomTag::new(0x0008, 0x0061);
    /// SOP Classes in Study
    pub const SOP_CLASSES_IN_STUDY: DicomTag = DicomTag::new(0x0008, 0x0062);
    /// Study Description
    pub const STUDY_DESCRIPTION: DicomTag = DicomTag::new(0x0008, 0x1030);
    /// Patient's Name
    pub const PATIENT_NAME: DicomTag = DicomTag::new(0x0010, 0x0010);
    /// Patient ID
    pub const PATIENT_ID: DicomTag = DicomTag::new(0x0010, 0x0020);
    /// Study Instance UID, the entity identifier of a study-level response
    pub const STUDY_INSTANCE_UID: DicomTag = DicomTag::new(0x0020, 0x000D);
    /// Number of Study Related Series
    pub const NUMBER_OF_STUDY_RELATED_SERIES: DicomTag = DicomTag::new(0x0020, 0x1206);
    /// Number of Study Related Instances
    pub const NUMBER_OF_STUDY_RELATED_INSTANCES: DicomTag = DicomTag::new(0x0020, 0x1208);

    /// Creates a tag from its group and element numbers
    pub const fn new(group: u16, element: u16) -> Self {
        Self { group, element }
    }

    /// Group number
    pub fn group(&self) -> u16 {
        self.group
    }

    /// Element number
    pub fn element(&self) -> u16 {
        self.element
    }

    /// The study-level return keys requested by default on every query
    pub fn standard_study_tags() -> Vec<DicomTag> {
        vec![
            Self::SPECIFIC_CHARACTER_SET,
            Self::STUDY_DATE,
            Self::STUDY_TIME,
            Self::ACCESSION_NUMBER,
            Self::PATIENT_NAME,
            Self::PATIENT_ID,
            Self::STUDY_INSTANCE_UID,
            Self::MODALITIES_IN_STUDY,
            Self::SOP_CLASSES_IN_STUDY,
            Self::STUDY_DESCRIPTION,
            Self::NUMBER_OF_STUDY_RELATED_SERIES,
            Self::NUMBER_OF_STUDY_RELATED_INSTANCES,
        ]
    }
}

impl fmt::Display for DicomTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X},{:04X}", self.group, self.element)
    }
}

impl FromStr for DicomTag {
    type Err = String;

    /// Parses `gggg,eeee`, optionally wrapped in parentheses, in either case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')');
        let (group, element) = inner
            .split_once(',')
            .ok_or_else(|| format!("Invalid DICOM tag '{s}': expected gggg,eeee"))?;

        let parse_part = |part: &str| -> Result<u16, String> {
            if part.len() != 4 {
                return Err(format!("Invalid DICOM tag '{s}': expected 4 hex digits"));
            }
            u16::from_str_radix(part, 16).map_err(|_| format!("Invalid DICOM tag '{s}'"))
        };

        Ok(Self::new(parse_part(group)?, parse_part(element)?))
    }
}

impl TryFrom<String> for DicomTag {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DicomTag> for String {
    fn from(value: DicomTag) -> Self {
        value.to_string()
    }
}
