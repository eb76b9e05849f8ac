//! Symptom ranking - scores every disease against the symptoms a user reported

use std::collections::HashSet;
use crate::domain::entities::{DiseaseDatabase, ScoredCandidate};

/// Candidates scoring below this are never reported
pub const DEFAULT_MIN_SCORE: f64 = 0.01;

/// Number of candidates kept in a diagnosis
pub const DEFAULT_RESULT_COUNT: usize = 5;

/// Tunables for the ranking pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingSettings {
    pub min_score: f64,
    pub result_count: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            result_count: DEFAULT_RESULT_COUNT,
        }
    }
}

/// Outcome of a ranking pass
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnosis {
    /// Best matches first, never empty
    Candidates(Vec<ScoredCandidate>),
    /// Nothing reached the threshold
    Insufficient,
}

impl Diagnosis {
    pub fn candidates(&self) -> &[ScoredCandidate] {
        match self {
            Diagnosis::Candidates(c) => c,
            Diagnosis::Insufficient => &[],
        }
    }
}

/// Rank every record in `database` against the reported `symptoms`.
///
/// Tokens are lower-cased, trimmed and de-duplicated. A record scores
/// `common * (tokens / record symptoms)` where `common` counts the record's
/// symptoms present among the tokens. Records without symptoms are skipped.
pub fn rank<S: AsRef<str>>(
    database: &DiseaseDatabase,
    symptoms: &[S],
    settings: &RankingSettings,
) -> Diagnosis {
    let given: HashSet<String> = symptoms
        .iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    if given.is_empty() {
        return Diagnosis::Insufficient;
    }

    let mut candidates: Vec<ScoredCandidate> = database
        .records()
        .filter(|record| !record.symptoms.is_empty())
        .map(|record| {
            let common = record
                .symptoms
                .iter()
                .filter(|s| given.contains(&s.to_lowercase()))
                .count();
            let score = common as f64 * (given.len() as f64 / record.symptoms.len() as f64);
            ScoredCandidate {
                name: record.name.clone(),
                score,
            }
        })
        .filter(|c| c.score >= settings.min_score)
        .collect();

    if candidates.is_empty() {
        return Diagnosis::Insufficient;
    }

    // sort_by is stable, so equal scores keep database order
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    // a diagnosis always names at least the best match
    candidates.truncate(settings.result_count.max(1));

    if let Some(best) = candidates.first() {
        tracing::debug!(
            "Ranked {} symptoms: {} candidates, best {} ({:.3})",
            given.len(),
            candidates.len(),
            best.name,
            best.score
        );
    }

    Diagnosis::Candidates(candidates)
}
