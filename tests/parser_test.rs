//! Integration tests for query response parsing

use nmdose::core::parser::{count_pending_responses, parse_responses, StudySummary};
use nmdose::domain::tag::DicomTag;

const FINDSCU_OUTPUT: &str = "\
I: Requesting Association
I: Association Accepted (Max Send PDV: 16372)
I: Sending Find Request (MsgID 1)
I: Request Identifiers:
I:
I: # Dicom-Data-Set
I: (0008,0020) DA [20220102-20220104]                     #  18, 1 StudyDate
I: (0008,0052) CS [STUDY]                                  #   6, 1 QueryRetrieveLevel
I: (0008,0061) CS [PT]                                     #   2, 1 ModalitiesInStudy
I: (0020,000d) UI (no value available)                     #   0, 0 StudyInstanceUID
I:
I: ---------------------------
I: Find Response: 1 (Pending)
I:
I: # Dicom-Data-Set
I: (0008,0005) CS [ISO_IR 100]                             #  10, 1 SpecificCharacterSet
I: (0008,0020) DA [20220103]                               #   8, 1 StudyDate
I: (0008,0030) TM [134502.123456]                          #  14, 1 StudyTime
I: (0008,0050) SH [ACC0001 ]                               #   8, 1 AccessionNumber
I: (0008,0061) CS [PT\\CT]                                 #   6, 2 ModalitiesInStudy
I: (0008,1030) LO [PET-CT WHOLE BODY]                      #  18, 1 StudyDescription
I: (0010,0010) PN [DOE^JANE]                               #   8, 1 PatientName
I: (0010,0020) LO [P0001]                                  #   6, 1 PatientID
I: (0020,000d) UI [1.2.826.0.1.3680043.8.498.1]            #  28, 1 StudyInstanceUID
I: (0020,1206) IS [3]                                      #   2, 1 NumberOfStudyRelatedSeries
I: (0020,1208) IS [412]                                    #   4, 1 NumberOfStudyRelatedInstances
I:
I: ---------------------------
I: Find Response: 2 (Pending)
I:
I: # Dicom-Data-Set
I: (0008,0020) DA [2022-01-04]                             #  10, 1 StudyDate
I: (0008,0030) TM [99]                                     #   2, 1 StudyTime
I: (0020,000d) UI [1.2.826.0.1.3680043.8.498.2]            #  28, 1 StudyInstanceUID
I: (0020,1206) IS []                                       #   0, 1 NumberOfStudyRelatedSeries
I:
I: Received Final Find Response (Success)
I: Releasing Association
";

#[test]
fn test_worked_example() {
    let raw = "I: ---\nI: Find Response: 1\n(0020,000D) UI [1.2.3]\n(0008,0020) DA [20230101]";
    let records = parse_responses(raw);

    assert_eq!(records.len(), 1);
    let entries: Vec<(String, &str)> = records[0]
        .iter()
        .map(|(tag, value)| (tag.to_string(), value))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("0020,000D".to_string(), "1.2.3"),
            ("0008,0020".to_string(), "20230101"),
        ]
    );
}

#[test]
fn test_full_findscu_output() {
    let records = parse_responses(FINDSCU_OUTPUT);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].len(), 11);
    assert_eq!(
        records[0].entity_identifier(),
        Some("1.2.826.0.1.3680043.8.498.1")
    );
    assert_eq!(records[0].get(&DicomTag::ACCESSION_NUMBER), Some("ACC0001"));
    // The query echo before the first separator never becomes a record
    assert!(records
        .iter()
        .all(|r| r.get(&DicomTag::new(0x0008, 0x0052)).is_none()));
}

#[test]
fn test_study_summary_conversion() {
    let records = parse_responses(FINDSCU_OUTPUT);
    let summary = StudySummary::from_record(&records[0]);

    assert!(summary.is_clean());
    assert_eq!(summary.study_date.unwrap().to_string(), "2022-01-03");
    assert_eq!(summary.study_time.unwrap().to_string(), "13:45:02");
    assert_eq!(summary.modalities_in_study, vec!["PT", "CT"]);
    assert_eq!(summary.patient_name.as_deref(), Some("DOE^JANE"));
    assert_eq!(summary.number_of_series, Some(3));
    assert_eq!(summary.number_of_instances, Some(412));
}

#[test]
fn test_malformed_fields_do_not_abort_parsing() {
    let records = parse_responses(FINDSCU_OUTPUT);
    let summary = StudySummary::from_record(&records[1]);

    assert_eq!(
        summary.study_instance_uid.as_deref(),
        Some("1.2.826.0.1.3680043.8.498.2")
    );
    assert!(summary.study_date.is_none());
    assert!(summary.study_time.is_none());
    assert!(summary.number_of_series.is_none());

    let failed: Vec<DicomTag> = summary.field_errors.iter().map(|e| e.tag).collect();
    assert_eq!(failed, vec![DicomTag::STUDY_DATE, DicomTag::STUDY_TIME]);
}

#[test]
fn test_empty_and_unrelated_input() {
    assert!(parse_responses("").is_empty());
    assert!(parse_responses("E: Association Rejected\n").is_empty());
}

#[test]
fn test_block_without_attributes_yields_empty_record() {
    let raw = "I: ----\nI: Find Response: 1 (Pending)\nI:\nI: ----\nI: Find Response: 2 (Pending)\n(0020,000D) UI [9.9]\n";
    let records = parse_responses(raw);

    assert_eq!(records.len(), 2);
    assert!(records[0].is_empty());
    assert!(records[0].entity_identifier().is_none());
    assert_eq!(records[1].entity_identifier(), Some("9.9"));
}

#[test]
fn test_count_pending_move_responses() {
    let output = "\
I: Sending Move Request (MsgID 1)
I: Received Move Response 1 (Pending)
I: Received Move Response 2 (Pending)
I: Received Move Response 3 (Pending)
I: Received Final Move Response (Success)
";
    assert_eq!(count_pending_responses(output), 3);
    assert_eq!(count_pending_responses("E: Move Failed"), 0);
}
