//! JSON disease database loader
//!
//! The document is an object mapping disease names to
//! `[[symptom, ...], [treatment, ...]]`.

use std::fmt;
use std::path::Path;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::application::errors::StorageError;
use crate::domain::entities::{DiseaseDatabase, DiseaseRecord};

/// Entries in document order
struct RawDatabase(Vec<(String, (Vec<String>, Vec<String>))>);

impl<'de> Deserialize<'de> for RawDatabase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawDatabase;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of disease name to [symptoms, treatments]")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(RawDatabase(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Parse a disease database from JSON text.
///
/// Names are lower-cased; two names equal after lower-casing are rejected.
pub fn parse_database(json: &str) -> Result<DiseaseDatabase, StorageError> {
    let RawDatabase(entries) = serde_json::from_str(json)?;

    let mut database = DiseaseDatabase::new();
    for (name, (symptoms, treatments)) in entries {
        if symptoms.is_empty() {
            tracing::warn!("Disease '{}' has no symptoms and will never be diagnosed", name);
        }
        let record = DiseaseRecord::new(name.clone())
            .with_symptoms(symptoms)
            .with_treatments(treatments);
        if !database.insert(record) {
            return Err(StorageError::Duplicate(name.to_lowercase()));
        }
    }

    Ok(database)
}

/// Read and parse a disease database file
pub fn load_database(path: impl AsRef<Path>) -> Result<DiseaseDatabase, StorageError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let database = parse_database(&content)?;
    tracing::info!("Loaded {} diseases from {}", database.len(), path.display());
    Ok(database)
}
