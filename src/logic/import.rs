//! Participant import from CSV (`name` column, optional `seed` column).

use crate::models::{name_key, TournamentError};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct ParticipantRow {
    name: String,
    #[serde(default)]
    seed: Option<u32>,
}

/// A participant read from an import file, not yet stored.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImportedParticipant {
    pub name: String,
    pub seed: Option<u32>,
}

/// Read participants from CSV with a header row.
///
/// Blank names are skipped. Later rows repeating a name (case-insensitive) are
/// skipped with a warning. A malformed row fails the whole import.
pub fn read_participants_csv<R: Read>(reader: R) -> Result<Vec<ImportedParticipant>, TournamentError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut seen = HashSet::new();
    let mut imported = Vec::new();
    for (line, row) in csv_reader.deserialize::<ParticipantRow>().enumerate() {
        let row = row.map_err(|e| TournamentError::Import(format!("row {}: {}", line + 1, e)))?;
        if row.name.is_empty() {
            continue;
        }
        if !seen.insert(name_key(&row.name)) {
            log::warn!("Skipping duplicate participant {:?} in import", row.name);
            continue;
        }
        imported.push(ImportedParticipant {
            name: row.name,
            seed: row.seed,
        });
    }
    Ok(imported)
}
