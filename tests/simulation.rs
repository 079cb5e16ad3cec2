use clap::Parser;
use std::io::Write;
use tempfile::NamedTempFile;
use translation_sim::config::{Config, Geometry};
use translation_sim::error::Error;
use translation_sim::run_simulation;

fn address_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

/// Backing store where every byte of page `n` holds `n`.
fn storage_file(geometry: &Geometry) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let pages = geometry.page_mask as usize + 1;
    let bytes = (0..pages * geometry.page_size)
        .map(|x| (x / geometry.page_size) as u8)
        .collect::<Vec<u8>>();
    file.write_all(&bytes).unwrap();
    file
}

fn config(args: &[&str]) -> Config {
    Config::parse_from(std::iter::once("translation_sim").chain(args.iter().copied()))
}

#[test]
fn runs_without_backing_store() {
    let addresses = address_file(&["256", "256", "257"]);
    let config = config(&["--file-address", addresses.path().to_str().unwrap(), "--quiet"]);
    let tracker = run_simulation(&config).unwrap();
    assert_eq!(tracker.operations, 3);
    assert_eq!(tracker.faults, 1);
    assert_eq!(tracker.tlb_hits, 2);
}

#[test]
fn permissive_address_lines() {
    let addresses = address_file(&["not a number", "", "  512"]);
    let config = config(&["--file-address", addresses.path().to_str().unwrap(), "--quiet"]);
    let tracker = run_simulation(&config).unwrap();
    // two lines read as address 0, then page 2
    assert_eq!(tracker.operations, 3);
    assert_eq!(tracker.faults, 2);
    assert_eq!(tracker.tlb_hits, 1);
}

#[test]
fn runs_with_backing_store_and_lru() {
    let geometry = Geometry::STANDARD;
    let storage = storage_file(&geometry);
    let addresses = address_file(&["1000", "2000", "1001", "65535", "0"]);
    let config = config(&[
        "--file-address",
        addresses.path().to_str().unwrap(),
        "--file-storage",
        storage.path().to_str().unwrap(),
        "--policy",
        "lru",
        "--quiet",
    ]);
    let tracker = run_simulation(&config).unwrap();
    assert_eq!(tracker.operations, 5);
    assert_eq!(tracker.faults, 4);
    assert_eq!(tracker.tlb_hits, 1);
}

#[test]
fn validation_against_reference_trace() {
    let geometry = Geometry::STANDARD;
    let storage = storage_file(&geometry);
    let addresses = address_file(&["1000", "2000"]);
    // page 3 and page 7 hold their own page number in every byte
    let reference = address_file(&[
        "Virtual address: 1000 Physical address: 232 Value: 3",
        "Virtual address: 2000 Physical address: 464 Value: 7",
    ]);
    let config = config(&[
        "--file-address",
        addresses.path().to_str().unwrap(),
        "--file-storage",
        storage.path().to_str().unwrap(),
        "--file-validation",
        reference.path().to_str().unwrap(),
    ]);
    let tracker = run_simulation(&config).unwrap();
    assert_eq!(tracker.correct_accesses, 2);
}

#[test]
fn missing_address_file() {
    let config = config(&["--file-address", "no/such/addresses.txt"]);
    assert!(matches!(
        run_simulation(&config),
        Err(Error::InputSourceUnavailable { .. })
    ));
}

#[test]
fn missing_backing_store() {
    let addresses = address_file(&["1"]);
    let config = config(&[
        "--file-address",
        addresses.path().to_str().unwrap(),
        "--file-storage",
        "no/such/BACKING_STORE.bin",
    ]);
    assert!(matches!(
        run_simulation(&config),
        Err(Error::BackingStoreUnavailable { .. })
    ));
}

#[test]
fn truncated_backing_store() {
    let mut storage = NamedTempFile::new().unwrap();
    storage.write_all(&[0u8; 256]).unwrap();
    let addresses = address_file(&["1", "4096"]);
    let config = config(&[
        "--file-address",
        addresses.path().to_str().unwrap(),
        "--file-storage",
        storage.path().to_str().unwrap(),
        "--quiet",
    ]);
    assert!(matches!(
        run_simulation(&config),
        Err(Error::BackingStoreReadShort { page_number: 16, .. })
    ));
}

#[test]
fn invalid_geometry_rejected() {
    let addresses = address_file(&["1"]);
    let config = config(&[
        "--file-address",
        addresses.path().to_str().unwrap(),
        "--num-pages",
        "8",
    ]);
    assert!(matches!(
        run_simulation(&config),
        Err(Error::InvalidConfig(_))
    ));
}
