//! Diagnosis and disease lookups over the loaded disease database

use std::sync::Arc;
use crate::domain::entities::{DiseaseDatabase, DiseaseRecord};
use crate::domain::rules::{rank, Diagnosis, RankingSettings};

/// Appended to every diagnosis reply
pub const DISCLAIMER: &str = "Please note that this result is in no way a proper diagnosis.\n\
                              Consult a physician for a diagnosis.";

/// Reply when no disease reaches the score threshold
pub const INSUFFICIENT_INFORMATION: &str =
    "I don't have enough information to make a guess. Try listing more symptoms.";

const NONE_LISTED: &str = "none listed";

/// Service answering `diagnose` and `info` requests.
///
/// Holds the database behind an `Arc` so every request handler shares the
/// same read-only table.
#[derive(Debug, Clone)]
pub struct DiagnosisService {
    database: Arc<DiseaseDatabase>,
    settings: RankingSettings,
}

impl DiagnosisService {
    pub fn new(database: Arc<DiseaseDatabase>) -> Self {
        Self {
            database,
            settings: RankingSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: RankingSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Rank the database against the symptoms in `args`
    pub fn diagnose(&self, args: &[String]) -> Diagnosis {
        let symptoms = split_symptoms(args);
        rank(&self.database, symptoms.as_slice(), &self.settings)
    }

    /// Reply text for `diagnose`
    pub fn diagnose_reply(&self, args: &[String]) -> String {
        match self.diagnose(args) {
            Diagnosis::Candidates(candidates) => {
                let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
                format!("You might have: {}\n{}", names.join(", "), DISCLAIMER)
            }
            Diagnosis::Insufficient => INSUFFICIENT_INFORMATION.to_string(),
        }
    }

    /// Case-insensitive lookup; argument words are joined into one name
    pub fn info(&self, args: &[String]) -> Option<&DiseaseRecord> {
        self.database.get(&join_name(args))
    }

    /// Reply text for `info`
    pub fn info_reply(&self, args: &[String]) -> String {
        match self.info(args) {
            Some(record) => format!(
                "Symptoms for {} include: {}\nTreatments include: {}.",
                record.name,
                join_or_none(&record.symptoms),
                join_or_none(&record.treatments)
            ),
            None => format!("{} was not found in the database.", join_name(args).to_lowercase()),
        }
    }
}

/// Turn command arguments into symptom tokens.
///
/// Comma-separated input keeps multi-word symptoms together
/// (`runny nose, fever`); otherwise every word is a symptom.
pub fn split_symptoms(args: &[String]) -> Vec<String> {
    let joined = args.join(" ");
    if joined.contains(',') {
        joined
            .split(',')
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|s| !s.is_empty())
            .collect()
    } else {
        args.iter()
            .flat_map(|a| a.split_whitespace())
            .map(str::to_string)
            .collect()
    }
}

fn join_name(args: &[String]) -> String {
    args.iter()
        .flat_map(|a| a.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        NONE_LISTED.to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn service() -> DiagnosisService {
        let db: DiseaseDatabase = vec![
            DiseaseRecord::new("flu")
                .with_symptoms(["fever", "cough"])
                .with_treatments(["rest"]),
            DiseaseRecord::new("cold")
                .with_symptoms(["cough", "sneeze"])
                .with_treatments(["fluids"]),
            DiseaseRecord::new("common cold")
                .with_symptoms(["runny nose", "sore throat"])
                .with_treatments(["fluids", "rest"]),
            DiseaseRecord::new("mystery"),
        ]
        .into_iter()
        .collect();
        DiagnosisService::new(Arc::new(db))
    }

    #[test]
    fn test_diagnose_reply_lists_candidates_with_disclaimer() {
        let reply = service().diagnose_reply(&args(&["cough"]));

        assert!(reply.starts_with("You might have: flu, cold\n"));
        assert!(reply.ends_with(DISCLAIMER));
    }

    #[test]
    fn test_diagnose_reply_with_zero_result_count() {
        let service = service().with_settings(RankingSettings {
            result_count: 0,
            ..RankingSettings::default()
        });

        let reply = service.diagnose_reply(&args(&["fever"]));
        assert!(reply.starts_with("You might have: flu\n"), "Unexpected reply: {}", reply);
    }

    #[test]
    fn test_diagnose_reply_without_symptoms() {
        assert_eq!(service().diagnose_reply(&[]), INSUFFICIENT_INFORMATION);
    }

    #[test]
    fn test_diagnose_accepts_comma_separated_symptoms() {
        let diagnosis = service().diagnose(&args(&["Runny", "nose,", "sore", "throat"]));

        let names: Vec<&str> = diagnosis.candidates().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["common cold"]);
    }

    #[test]
    fn test_split_symptoms() {
        assert_eq!(split_symptoms(&args(&["fever", "cough"])), vec!["fever", "cough"]);
        assert_eq!(
            split_symptoms(&args(&["runny", "nose,", ",fever"])),
            vec!["runny nose", "fever"]
        );
        assert!(split_symptoms(&[]).is_empty());
    }

    #[test]
    fn test_info_reply_is_case_insensitive() {
        let service = service();
        assert_eq!(
            service.info_reply(&args(&["Flu"])),
            service.info_reply(&args(&["flu"]))
        );
        assert_eq!(
            service.info_reply(&args(&["flu"])),
            "Symptoms for flu include: fever, cough\nTreatments include: rest."
        );
    }

    #[test]
    fn test_info_reply_joins_multi_word_names() {
        let reply = service().info_reply(&args(&["Common", "Cold"]));
        assert_eq!(
            reply,
            "Symptoms for common cold include: runny nose, sore throat\nTreatments include: fluids, rest."
        );
    }

    #[test]
    fn test_info_reply_not_found() {
        assert_eq!(
            service().info_reply(&args(&["Plague"])),
            "plague was not found in the database."
        );
    }

    #[test]
    fn test_info_reply_empty_lists() {
        assert_eq!(
            service().info_reply(&args(&["mystery"])),
            "Symptoms for mystery include: none listed\nTreatments include: none listed."
        );
    }
}
