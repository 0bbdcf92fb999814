//! Integration tests for the pseudonym table

use nhsfilter::core::gate::PreApprovedGate;
use nhsfilter::core::generator::PseudonymGenerator;
use nhsfilter::core::store::{PseudonymStore, TABLE_FILE_NAME, TABLE_HEADER};
use nhsfilter::domain::NhsNumber;
use std::fs;
use tempfile::tempdir;

fn nhs(s: &str) -> NhsNumber {
    NhsNumber::parse(s).expect("valid NHS number")
}

#[test]
fn test_generated_mappings_survive_a_reload() {
    let dir = tempdir().unwrap();
    let table = dir.path().join(TABLE_FILE_NAME);

    let mut store = PseudonymStore::new(&table);
    let mut generator = PseudonymGenerator::seeded(17);
    let mut gate = PreApprovedGate;
    let reals = [nhs("9434765919"), nhs("0123456789"), nhs("4857773457")];
    let pseudonyms: Vec<NhsNumber> = reals
        .iter()
        .map(|real| store.resolve(*real, &mut gate, &mut generator).unwrap())
        .collect();
    store.save().unwrap();

    let mut reloaded = PseudonymStore::new(&table);
    let summary = reloaded.load([dir.path()], TABLE_FILE_NAME);
    assert_eq!(summary.loaded, 3);
    assert_eq!(summary.skipped, 1);

    for (real, pseudonym) in reals.iter().zip(&pseudonyms) {
        assert_eq!(reloaded.lookup(*real), Some(*pseudonym));
    }
}

#[test]
fn test_saved_table_layout() {
    let dir = tempdir().unwrap();
    let table = dir.path().join(TABLE_FILE_NAME);

    let mut store = PseudonymStore::new(&table);
    store.insert(nhs("9434765919"), nhs("4010232137"));
    store.insert(nhs("0123456789"), nhs("7000000007"));
    store.save().unwrap();

    let contents = fs::read_to_string(&table).unwrap();
    assert_eq!(
        contents,
        format!("{TABLE_HEADER}\n0123456789,7000000007\n9434765919,4010232137\n")
    );
}

#[test]
fn test_tables_written_by_spreadsheets_are_accepted() {
    let dir = tempdir().unwrap();
    let table = dir.path().join(TABLE_FILE_NAME);
    // Leading zeros dropped, quoted fields, CRLF line endings and a junk row
    fs::write(
        &table,
        "\"Real_NHS_Number\",\"Pseudonym_NHS_Number\"\r\n123456789,\"4010232137\"\r\nnot,a row\r\n",
    )
    .unwrap();

    let mut store = PseudonymStore::new(&table);
    let summary = store.load([dir.path()], TABLE_FILE_NAME);

    assert_eq!(summary.loaded, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(store.lookup(nhs("0123456789")), Some(nhs("4010232137")));
}
