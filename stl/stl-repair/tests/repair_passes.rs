//! End-to-end repair passes over real files on disk.
//!
//! Each test builds a synthetic binary STL in a temp directory, runs one
//! repair pass, and checks the output bytes directly.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use stl_io::layout::{COUNT_LEN, GEOMETRY_LEN, HEADER_LEN, TRIANGLE_LEN};
use stl_repair::{repair_file, RepairError, RepairOptions};

/// The synthetic file from the format's own test vector: an ascending-byte
/// header, two triangles filled with a repeating 5-byte pattern, attribute
/// counts 0xBB and 0xBC, and the 5 ASCII bytes "SKIRK" on the end.
fn synthetic_stl(declared: u32) -> Vec<u8> {
    let mut bytes = Vec::new();

    #[allow(clippy::cast_possible_truncation)]
    let header: Vec<u8> = (0u8..HEADER_LEN as u8).collect();
    bytes.extend_from_slice(&header);
    bytes.extend_from_slice(&declared.to_le_bytes());

    let pattern = [0xBAu8, 0xDC, 0x0F, 0xFE, 0xEE];
    for attr in [0xBBu16, 0xBC] {
        for i in 0..GEOMETRY_LEN {
            bytes.push(pattern[i % pattern.len()]);
        }
        bytes.extend_from_slice(&attr.to_le_bytes());
    }

    bytes.extend_from_slice(b"SKIRK");
    bytes
}

fn write_input(dir: &tempfile::TempDir, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join("input.stl");
    std::fs::write(&path, bytes).unwrap();
    path
}

fn count_field(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([
        bytes[HEADER_LEN],
        bytes[HEADER_LEN + 1],
        bytes[HEADER_LEN + 2],
        bytes[HEADER_LEN + 3],
    ])
}

#[test]
fn identity_pass_reproduces_input_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let input_bytes = synthetic_stl(2);
    assert_eq!(input_bytes.len(), HEADER_LEN + COUNT_LEN + 2 * TRIANGLE_LEN + 5);

    let input = write_input(&dir, &input_bytes);
    let output = dir.path().join("output.stl");
    let summary = repair_file(&input, &output, &RepairOptions::default()).unwrap();

    assert_eq!(std::fs::read(&output).unwrap(), input_bytes);
    assert_eq!(summary.declared, 2);
    assert_eq!(summary.emitted, 2);
    assert_eq!(summary.trailing_bytes, 5);
    assert!(!summary.count_patched);
}

#[test]
fn zero_header_clears_only_the_first_80_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let input_bytes = synthetic_stl(2);
    let input = write_input(&dir, &input_bytes);
    let output = dir.path().join("output.stl");

    let options = RepairOptions::default().with_zero_header(true);
    repair_file(&input, &output, &options).unwrap();

    let out = std::fs::read(&output).unwrap();
    assert!(out[..HEADER_LEN].iter().all(|&b| b == 0));
    assert_eq!(&out[HEADER_LEN..], &input_bytes[HEADER_LEN..]);
}

#[test]
fn zero_attributes_clears_each_record_attribute_field() {
    let dir = tempfile::tempdir().unwrap();
    let input_bytes = synthetic_stl(2);
    let input = write_input(&dir, &input_bytes);
    let output = dir.path().join("output.stl");

    let options = RepairOptions::default().with_zero_attribute_byte_counts(true);
    repair_file(&input, &output, &options).unwrap();

    let out = std::fs::read(&output).unwrap();
    assert_eq!(out.len(), input_bytes.len());
    for record in 0..2 {
        let start = HEADER_LEN + COUNT_LEN + record * TRIANGLE_LEN;
        // Geometry untouched, attribute zeroed.
        assert_eq!(
            &out[start..start + GEOMETRY_LEN],
            &input_bytes[start..start + GEOMETRY_LEN]
        );
        assert_eq!(&out[start + GEOMETRY_LEN..start + TRIANGLE_LEN], &[0, 0]);
    }
    // Trailing bytes survive.
    assert_eq!(&out[out.len() - 5..], b"SKIRK");
}

#[test]
fn triangle_limit_caps_emitted_records() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, &synthetic_stl(2));
    let output = dir.path().join("output.stl");

    let options = RepairOptions::default().with_triangle_limit(1);
    let summary = repair_file(&input, &output, &options).unwrap();

    assert_eq!(summary.seen, 2);
    assert_eq!(summary.emitted, 1);

    // One record plus the trailing bytes; the dropped record is not
    // forwarded as trailing data.
    let out = std::fs::read(&output).unwrap();
    assert_eq!(out.len(), HEADER_LEN + COUNT_LEN + TRIANGLE_LEN + 5);
    assert_eq!(&out[out.len() - 5..], b"SKIRK");
}

#[test]
fn triangle_limit_with_cleared_trailing_yields_minimal_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, &synthetic_stl(2));
    let output = dir.path().join("output.stl");

    let options = RepairOptions::default()
        .with_triangle_limit(1)
        .with_clear_trailing_data(true);
    repair_file(&input, &output, &options).unwrap();

    let out = std::fs::read(&output).unwrap();
    assert_eq!(out.len(), HEADER_LEN + COUNT_LEN + TRIANGLE_LEN);
}

#[test]
fn count_patch_rewrites_field_after_close() {
    let dir = tempfile::tempdir().unwrap();
    // Declares five triangles but only holds two (plus trailing bytes that
    // now read as a partial record).
    let input = write_input(&dir, &synthetic_stl(5));
    let output = dir.path().join("output.stl");

    let options = RepairOptions::default().with_update_triangle_count(true);
    let summary = repair_file(&input, &output, &options).unwrap();

    assert_eq!(summary.declared, 5);
    assert_eq!(summary.emitted, 2);
    assert!(summary.count_patched);
    assert_eq!(count_field(&std::fs::read(&output).unwrap()), 2);
}

#[test]
fn count_patch_is_idempotent_across_reruns() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, &synthetic_stl(5));
    let first = dir.path().join("first.stl");
    let second = dir.path().join("second.stl");

    let options = RepairOptions::default().with_update_triangle_count(true);
    let summary = repair_file(&input, &first, &options).unwrap();
    assert!(summary.count_patched);

    // The first output already declares the true count, so a second pass
    // must not patch again.
    let summary = repair_file(&first, &second, &options).unwrap();
    assert!(!summary.count_patched);
    assert_eq!(
        count_field(&std::fs::read(&second).unwrap()),
        count_field(&std::fs::read(&first).unwrap())
    );
}

#[test]
fn declared_count_stays_wrong_without_the_patch_option() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, &synthetic_stl(5));
    let output = dir.path().join("output.stl");

    let summary = repair_file(&input, &output, &RepairOptions::default()).unwrap();

    assert_eq!(summary.emitted, 2);
    assert_eq!(count_field(&std::fs::read(&output).unwrap()), 5);
}

#[test]
fn truncated_final_record_round_trips_as_trailing_data() {
    let dir = tempfile::tempdir().unwrap();
    let mut input_bytes = synthetic_stl(2);
    input_bytes.truncate(HEADER_LEN + COUNT_LEN + 2 * TRIANGLE_LEN - 1);

    let input = write_input(&dir, &input_bytes);
    let output = dir.path().join("output.stl");
    let summary = repair_file(&input, &output, &RepairOptions::default()).unwrap();

    // The 49-byte fragment is carried verbatim, so the identity holds even
    // for a truncated input.
    assert_eq!(summary.emitted, 1);
    assert_eq!(summary.trailing_bytes, TRIANGLE_LEN - 1);
    assert_eq!(std::fs::read(&output).unwrap(), input_bytes);
}

#[test]
fn clear_trailing_data_drops_anomalous_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, &synthetic_stl(2));
    let output = dir.path().join("output.stl");

    let options = RepairOptions::default().with_clear_trailing_data(true);
    let summary = repair_file(&input, &output, &options).unwrap();

    assert_eq!(summary.trailing_bytes, 0);
    let out = std::fs::read(&output).unwrap();
    assert_eq!(out.len(), HEADER_LEN + COUNT_LEN + 2 * TRIANGLE_LEN);
}

#[test]
fn missing_input_is_a_codec_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.stl");
    let err = repair_file("/no/such/input.stl", &output, &RepairOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        RepairError::Codec(stl_io::StlIoError::FileNotFound { .. })
    ));
    // No partial output left behind.
    assert!(!output.exists());
}

#[test]
fn empty_output_path_is_rejected_before_any_write() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, &synthetic_stl(2));
    let err = repair_file(&input, "", &RepairOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        RepairError::Codec(stl_io::StlIoError::EmptyPath)
    ));
}
