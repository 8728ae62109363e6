//! Participant import from CSV (`name,email`; email may be blank).

use crate::models::Participant;
use serde::Deserialize;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Row {line} has an empty name")]
    EmptyName { line: u64 },
}

#[derive(Deserialize)]
struct ParticipantRow {
    name: String,
    #[serde(default)]
    email: Option<String>,
}

/// Read participants from CSV with a header row. Each row gets a fresh participant id.
pub fn read_participants<R: Read>(reader: R) -> Result<Vec<Participant>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut participants = Vec::new();
    // Line 1 is the header.
    for (line, record) in (2u64..).zip(rdr.deserialize::<ParticipantRow>()) {
        let row = record?;
        if row.name.is_empty() {
            return Err(ImportError::EmptyName { line });
        }
        let mut p = Participant::new(row.name);
        p.email = row.email.filter(|e| !e.is_empty());
        participants.push(p);
    }
    Ok(participants)
}
