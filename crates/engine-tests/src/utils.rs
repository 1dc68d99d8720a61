use connectors::file::csv::error::FileError;
use model::{entity::Entreprise, records::source::SourceRecord};
use std::io::Write;
use tempfile::NamedTempFile;

/// Header of an INSEE `StockUniteLegale` extract, reduced to the fields the
/// tests look at.
pub const CSV_HEADER: &str = "siren,nomUniteLegale,denominationUniteLegale,sigleUniteLegale,\
dateCreationUniteLegale,activitePrincipaleUniteLegale,caractereEmployeurUniteLegale";

pub fn siren(n: usize) -> String {
    format!("{n:09}")
}

/// A source record carrying a siren and a legal name.
pub fn source_record(siren: &str, denomination: &str) -> SourceRecord {
    SourceRecord::new(vec![
        ("siren".to_string(), Some(siren.to_string())),
        (
            "denominationUniteLegale".to_string(),
            Some(denomination.to_string()),
        ),
        ("sigleUniteLegale".to_string(), Some(String::new())),
    ])
}

/// `count` records with consecutive sirens starting at `first`.
pub fn source_records(first: usize, count: usize) -> Vec<SourceRecord> {
    (first..first + count)
        .map(|n| source_record(&siren(n), &format!("COMPANY {n}")))
        .collect()
}

pub type RecordStream = std::vec::IntoIter<Result<SourceRecord, FileError>>;

/// An opener that yields `records` in order.
pub fn stream_of(records: Vec<SourceRecord>) -> impl FnOnce() -> Result<RecordStream, FileError> {
    move || Ok(records.into_iter().map(Ok).collect::<Vec<_>>().into_iter())
}

/// An opener that yields `records` and then fails.
pub fn failing_stream_of(
    records: Vec<SourceRecord>,
) -> impl FnOnce() -> Result<RecordStream, FileError> {
    move || {
        let failed_at = records.len() as u64 + 1;
        let mut items: Vec<_> = records.into_iter().map(Ok).collect();
        items.push(Err(FileError::ReadError {
            record: failed_at,
            message: "unterminated quoted field".into(),
        }));
        Ok(items.into_iter())
    }
}

/// Writes `lines` below [`CSV_HEADER`] into a temporary file.
pub fn write_csv(lines: &[&str]) -> NamedTempFile {
    write_raw_csv(&format!("{CSV_HEADER}\n{}\n", lines.join("\n")))
}

pub fn write_raw_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp csv");
    file.write_all(content.as_bytes()).expect("write temp csv");
    file.flush().expect("flush temp csv");
    file
}

pub fn entreprise(
    siren: &str,
    nom: Option<&str>,
    denomination: Option<&str>,
    activite: Option<&str>,
) -> Entreprise {
    Entreprise {
        siren: siren.to_string(),
        nom: nom.map(str::to_string),
        denomination: denomination.map(str::to_string),
        activite_principale: activite.map(str::to_string),
        ..Default::default()
    }
}

/// 45 software companies, 3 bakeries, 1 unit without activity.
pub fn sample_entreprises() -> Vec<Entreprise> {
    let mut all: Vec<Entreprise> = (0..45)
        .map(|n| {
            entreprise(
                &siren(100_000 + n),
                None,
                Some(&format!("Logiciels {n}")),
                Some("62.01Z"),
            )
        })
        .collect();
    all.push(entreprise("200000001", Some("DUPONT"), None, Some("10.71C")));
    all.push(entreprise("200000002", None, Some("Boulangerie Dupont"), Some("10.71C")));
    all.push(entreprise("200000003", None, Some("Fournil 100%_bio"), Some("10.71C")));
    all.push(entreprise("300000001", None, Some("Sans activite"), None));
    all
}
