use super::matching::{jaccard, rank, Scored};
use super::report::{Recommendation, Report};
use super::store::{User, UserStore};
use crate::error::MatchError;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

/// How candidates are gathered for each user.
///
/// `Indexed` only scores users sharing an interest, so fully disjoint pairs
/// never show up even with a zero threshold. `Exhaustive` scores every other
/// user and reports zero-similarity pairs when the threshold allows it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CandidateMode {
    #[default]
    Indexed,
    Exhaustive,
}

impl Display for CandidateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateMode::Indexed => write!(f, "indexed"),
            CandidateMode::Exhaustive => write!(f, "exhaustive"),
        }
    }
}

impl FromStr for CandidateMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "indexed" => Ok(CandidateMode::Indexed),
            "exhaustive" => Ok(CandidateMode::Exhaustive),
            other => Err(anyhow::anyhow!("unknown candidate mode: {}", other)),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Minimum similarity for a candidate to be listed, within [0, 1].
    pub threshold: f64,
    /// Maximum recommendations per user, unbounded when `None`.
    pub top_n: Option<usize>,
    pub mode: CandidateMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            top_n: None,
            mode: CandidateMode::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RecommendationEngine {
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig) -> Result<Self, MatchError> {
        if !(0.0..=1.0).contains(&config.threshold) {
            return Err(MatchError::InvalidThreshold(config.threshold));
        }
        if config.top_n == Some(0) {
            return Err(MatchError::InvalidTopN);
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ranks, for every user in `store`, the other users by interest overlap.
    ///
    /// Returns an empty report when fewer than two users are loaded. Otherwise
    /// every user gets an entry, possibly an empty list.
    pub fn recommend(&self, store: &UserStore) -> Report {
        let mut report = Report::default();
        if store.len() < 2 {
            debug!("recommend: {} users loaded, nothing to compare", store.len());
            return report;
        }

        for (key, user) in store.iter() {
            let scored = self
                .candidates(store, key, user)
                .into_iter()
                .filter_map(|candidate| {
                    let other = store.get(candidate)?;
                    Some(Scored {
                        key: candidate,
                        similarity: jaccard(&user.interests, &other.interests),
                    })
                })
                .collect::<Vec<_>>();
            debug!("recommend: {} has {} candidates", user.name, scored.len());

            let recommendations = rank(scored, self.config.threshold, self.config.top_n)
                .into_iter()
                .filter_map(|s| {
                    store.get(s.key).map(|other| Recommendation {
                        user: other.name.clone(),
                        score: s.similarity,
                    })
                })
                .collect();
            report.insert(user.name.clone(), recommendations);
        }
        info!(
            "recommend: {} users ranked, mode: {}, threshold: {}, top_n: {:?}",
            report.len(),
            self.config.mode,
            self.config.threshold,
            self.config.top_n
        );
        report
    }

    fn candidates<'s>(&self, store: &'s UserStore, key: &str, user: &User) -> BTreeSet<&'s str> {
        let mut candidates = match self.config.mode {
            CandidateMode::Indexed => store.candidate_users(&user.interests),
            CandidateMode::Exhaustive => store.keys().collect(),
        };
        candidates.remove(key);
        candidates
    }
}
