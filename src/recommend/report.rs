use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub user: String,
    pub score: f64,
}

/// User name -> recommendations, best first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report(BTreeMap<String, Vec<Recommendation>>);

impl Report {
    pub fn insert(&mut self, user: String, recommendations: Vec<Recommendation>) {
        self.0.insert(user, recommendations);
    }

    #[cfg(test)]
    pub fn get(&self, user: &str) -> Option<&[Recommendation]> {
        self.0.get(user).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Recommendation])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Writes `report` as pretty JSON. The file is written beside `path` first and
/// renamed over it, so readers never see a partial report.
pub async fn save_report(report: &Report, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);
    fs::write(&staging, json).await?;
    fs::rename(&staging, path).await?;
    info!("recommendations saved to {}", path.display());
    Ok(())
}
