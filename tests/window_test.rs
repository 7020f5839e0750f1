//! Integration tests for batch window calculation

use chrono::NaiveDate;
use nmdose::core::window::{compute_window, BatchWindow};
use test_case::test_case;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test_case("2022-01-01", 3, "2022-01-10", Some("2022-01-02"), "20220102-20220104" ; "resumes from watermark")]
#[test_case("2022-01-01", 3, "2022-01-10", Some("2022-01-09"), "20220109-20220110" ; "clamped to cutover")]
#[test_case("2022-01-01", 3, "2022-01-10", None, "20220101-20220103" ; "first run starts at configured start")]
#[test_case("2022-03-01", 5, "2022-12-31", Some("2022-01-15"), "20220301-20220305" ; "stale watermark before configured start")]
#[test_case("2022-01-01", 1, "2022-01-10", Some("2022-01-05"), "20220105-20220105" ; "single day batch")]
#[test_case("2022-01-01", 3, "2022-01-10", Some("2022-01-10"), "20220110-20220110" ; "watermark on cutover")]
#[test_case("2022-01-01", 0, "2022-01-10", None, "20220101-20220101" ; "zero length treated as one day")]
#[test_case("2024-02-27", 4, "2024-12-31", None, "20240227-20240301" ; "crosses leap day")]
fn test_compute_window(
    start: &str,
    batch_days: u32,
    cutover: &str,
    watermark: Option<&str>,
    expected: &str,
) {
    let window = compute_window(d(start), batch_days, d(cutover), watermark.map(d));
    assert_eq!(window.format_token(), expected);
    assert!(!window.is_empty());
}

#[test]
fn test_window_past_cutover_is_empty() {
    let window = compute_window(d("2022-01-01"), 3, d("2022-01-10"), Some(d("2022-01-12")));

    assert!(window.is_empty());
    assert_eq!(window.start, d("2022-01-12"));
    assert_eq!(window.end, d("2022-01-10"));
}

#[test]
fn test_window_never_exceeds_cutover_or_batch_length() {
    let start = d("2022-01-01");
    let cutover = d("2022-02-15");

    for batch_days in 1..=40u32 {
        for offset in 0..50i64 {
            let watermark = start + chrono::Duration::days(offset);
            let window = compute_window(start, batch_days, cutover, Some(watermark));
            if window.is_empty() {
                assert!(watermark > cutover);
                continue;
            }
            assert!(window.start <= window.end);
            assert!(window.end <= cutover);
            assert!(window.days() <= i64::from(batch_days));
            assert_eq!(window.start, watermark);
        }
    }
}

#[test_case(1 ; "single day batches")]
#[test_case(3 ; "three day batches")]
#[test_case(7 ; "weekly batches")]
fn test_consecutive_windows_tile_range_until_caught_up(batch_days: u32) {
    let start = d("2022-01-01");
    let cutover = d("2022-01-20");
    let mut watermark = None;
    let mut covered = Vec::new();

    for _ in 0..=30 {
        let window = compute_window(start, batch_days, cutover, watermark);
        if window.is_empty() {
            break;
        }
        if let Some(&last) = covered.last() {
            assert_eq!(window.start, last + chrono::Duration::days(1));
        }
        covered.extend(window.start.iter_days().take(window.days() as usize));
        watermark = Some(window.resume_date());
    }

    assert!(compute_window(start, batch_days, cutover, watermark).is_empty());
    assert_eq!(covered.first(), Some(&start));
    assert_eq!(covered.last(), Some(&cutover));
    assert_eq!(covered.len(), 20);
}

#[test]
fn test_token_round_trip() {
    let window = BatchWindow::new(d("2022-01-02"), d("2022-01-04"));
    assert_eq!(BatchWindow::parse(&window.format_token()).unwrap(), window);
    assert!(BatchWindow::parse("2022-01-02").is_err());
}
