use std::collections::HashMap;

/// Stored symptom and treatment data for one named condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseRecord {
    pub name: String,
    pub symptoms: Vec<String>,
    pub treatments: Vec<String>,
}

impl DiseaseRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symptoms: Vec::new(),
            treatments: Vec::new(),
        }
    }

    pub fn with_symptoms<I, S>(mut self, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symptoms = symptoms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_treatments<I, S>(mut self, treatments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.treatments = treatments.into_iter().map(Into::into).collect();
        self
    }
}

/// A disease considered during diagnosis, with its computed score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub name: String,
    pub score: f64,
}

/// Read-only disease table keyed by lower-cased name.
///
/// Records keep the order they were inserted in, which is the order ranking
/// falls back to when two candidates score the same.
#[derive(Debug, Clone, Default)]
pub struct DiseaseDatabase {
    records: Vec<DiseaseRecord>,
    index: HashMap<String, usize>,
}

impl DiseaseDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its lower-cased name.
    ///
    /// Returns `false` and leaves the database untouched when the key is
    /// already present.
    pub fn insert(&mut self, mut record: DiseaseRecord) -> bool {
        let key = record.name.to_lowercase();
        if self.index.contains_key(&key) {
            return false;
        }
        record.name = key.clone();
        self.index.insert(key, self.records.len());
        self.records.push(record);
        true
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&DiseaseRecord> {
        self.index
            .get(&name.to_lowercase())
            .map(|&i| &self.records[i])
    }

    pub fn records(&self) -> impl Iterator<Item = &DiseaseRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<DiseaseRecord> for DiseaseDatabase {
    /// Later duplicates are dropped.
    fn from_iter<T: IntoIterator<Item = DiseaseRecord>>(iter: T) -> Self {
        let mut db = Self::new();
        for record in iter {
            db.insert(record);
        }
        db
    }
}
