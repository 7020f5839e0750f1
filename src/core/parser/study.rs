//! Typed study-level view of an attribute record

use super::AttributeRecord;
use crate::domain::tag::DicomTag;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// A typed field that could not be converted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Tag of the offending attribute
    pub tag: DicomTag,

    /// Raw value as printed by the tool
    pub value: String,

    /// Conversion failure message
    pub message: String,
}

/// Study-level summary extracted from one query response
///
/// Conversion of each typed field is independent: a malformed date leaves
/// `study_date` empty and adds a [`FieldError`] while every other field is
/// still populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudySummary {
    pub study_instance_uid: Option<String>,
    pub study_date: Option<NaiveDate>,
    pub study_time: Option<NaiveTime>,
    pub accession_number: Option<String>,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub modalities_in_study: Vec<String>,
    pub study_description: Option<String>,
    pub number_of_series: Option<u32>,
    pub number_of_instances: Option<u32>,
    pub field_errors: Vec<FieldError>,
}

impl StudySummary {
    /// Build a summary from a parsed record
    pub fn from_record(record: &AttributeRecord) -> Self {
        let mut summary = Self {
            study_instance_uid: text(record, DicomTag::STUDY_INSTANCE_UID),
            accession_number: text(record, DicomTag::ACCESSION_NUMBER),
            patient_id: text(record, DicomTag::PATIENT_ID),
            patient_name: text(record, DicomTag::PATIENT_NAME),
            study_description: text(record, DicomTag::STUDY_DESCRIPTION),
            modalities_in_study: record
                .get(&DicomTag::MODALITIES_IN_STUDY)
                .map(|v| {
                    v.split('\\')
                        .map(str::trim)
                        .filter(|m| !m.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            ..Self::default()
        };

        summary.study_date = summary.convert(record, DicomTag::STUDY_DATE, |v| {
            NaiveDate::parse_from_str(v, "%Y%m%d").map_err(|e| e.to_string())
        });
        summary.study_time = summary.convert(record, DicomTag::STUDY_TIME, |v| {
            // Fractional seconds are dropped
            let whole = v.split('.').next().unwrap_or(v);
            NaiveTime::parse_from_str(whole, "%H%M%S").map_err(|e| e.to_string())
        });
        summary.number_of_series =
            summary.convert(record, DicomTag::NUMBER_OF_STUDY_RELATED_SERIES, |v| {
                v.parse::<u32>().map_err(|e| e.to_string())
            });
        summary.number_of_instances =
            summary.convert(record, DicomTag::NUMBER_OF_STUDY_RELATED_INSTANCES, |v| {
                v.parse::<u32>().map_err(|e| e.to_string())
            });

        summary
    }

    /// Whether every typed field converted cleanly
    pub fn is_clean(&self) -> bool {
        self.field_errors.is_empty()
    }

    fn convert<T>(
        &mut self,
        record: &AttributeRecord,
        tag: DicomTag,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Option<T> {
        let raw = record.get(&tag).filter(|v| !v.is_empty())?;
        match parse(raw) {
            Ok(value) => Some(value),
            Err(message) => {
                self.field_errors.push(FieldError {
                    tag,
                    value: raw.to_string(),
                    message,
                });
                None
            }
        }
    }
}

fn text(record: &AttributeRecord, tag: DicomTag) -> Option<String> {
    record
        .get(&tag)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
