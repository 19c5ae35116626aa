use crate::records::validate::{validate_submission, SubmissionError};
use crate::records::{self, synthetic, Record};
use crate::recommend::engine::RecommendationEngine;
use crate::recommend::report::{save_report, Report};
use crate::recommend::store::UserStore;
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task;

/// Everything the page shows: the registered rows and their rankings.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Snapshot {
    pub users: Vec<Record>,
    /// Rows skipped while loading the store.
    pub rejected: usize,
    pub recommendations: Report,
}

pub enum Registration {
    Saved(Record),
    Refused(SubmissionError),
}

/// The record file plus the engine settings used to rank it.
///
/// Nothing about users is kept in memory between calls; every snapshot
/// re-reads the file and builds a fresh store.
pub struct Registry {
    data_file: PathBuf,
    engine: RecommendationEngine,
    report_file: Option<PathBuf>,
    // appends are mutually exclusive, reads may run alongside
    write_lock: Mutex<()>,
    report_lock: Mutex<()>,
}

impl Registry {
    pub async fn new(
        data_file: PathBuf,
        engine: RecommendationEngine,
        report_file: Option<PathBuf>,
    ) -> Result<Self> {
        let path = data_file.clone();
        task::spawn_blocking(move || records::initialize(&path)).await??;
        info!(
            "registry init, data file: {}, engine: {:?}",
            data_file.display(),
            engine.config()
        );
        Ok(Self {
            data_file,
            engine,
            report_file,
            write_lock: Mutex::new(()),
            report_lock: Mutex::new(()),
        })
    }

    pub async fn read_records(&self) -> Result<Vec<Record>> {
        let path = self.data_file.clone();
        let records = task::spawn_blocking(move || records::read_all(&path)).await??;
        Ok(records)
    }

    /// Re-reads every record and ranks them with a request-scoped store.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let users = self.read_records().await?;

        let start = Instant::now();
        let mut store = UserStore::new();
        let summary = store.load(&users);
        if !summary.rejected.is_empty() {
            let rows = summary
                .rejected
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>();
            warn!(
                "{} of {} rows in {} not loaded: {}",
                rows.len(),
                users.len(),
                self.data_file.display(),
                rows.join("; ")
            );
        }
        let recommendations = self.engine.recommend(&store);
        let elapsed = start.elapsed().as_secs_f64();
        if recommendations.is_empty() {
            debug!("fewer than two users, no recommendations");
        }
        let pairs: usize = recommendations.iter().map(|(_, recs)| recs.len()).sum();
        info!(
            "recommend {} users, {} pairs spends {}s",
            summary.loaded, pairs, elapsed
        );

        if let Some(path) = &self.report_file {
            let _guard = self.report_lock.lock().await;
            if let Err(e) = save_report(&recommendations, path).await {
                warn!("save report to {} failed: {}", path.display(), e);
            }
        }
        Ok(Snapshot {
            users,
            rejected: summary.rejected.len(),
            recommendations,
        })
    }

    /// Validates and appends one submission.
    pub async fn register(
        &self,
        name: Option<String>,
        interests: Option<String>,
    ) -> Result<Registration> {
        let _guard = self.write_lock.lock().await;
        let existing = self.read_records().await?;
        let (name, interests) =
            match validate_submission(name.as_deref(), interests.as_deref(), &existing) {
                Ok((name, interests)) => (name.to_string(), interests.to_string()),
                Err(e) => {
                    info!("registration refused: {}", e);
                    return Ok(Registration::Refused(e));
                }
            };

        let path = self.data_file.clone();
        let record =
            task::spawn_blocking(move || records::append(&path, &name, &interests)).await??;
        Ok(Registration::Saved(record))
    }

    /// Fills an empty record file with generated users. Returns how many were added.
    pub async fn seed(&self, count: usize, per_user: usize) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        if count == 0 || !self.read_records().await?.is_empty() {
            return Ok(0);
        }
        let path = self.data_file.clone();
        task::spawn_blocking(move || -> Result<usize> {
            let generated = synthetic::generate(count, per_user);
            for record in generated.iter() {
                records::append(&path, &record.name, &record.interests)?;
            }
            Ok(generated.len())
        })
        .await?
    }
}
