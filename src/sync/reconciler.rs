use crate::db::UserRepository;
use crate::models::User;

/// What one remote record does to the local store.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// No local record with this id yet
    Insert(User),
    /// A local record exists; remote values fill what it lacks
    Merge(User),
    /// The local record is soft-deleted and stays that way
    SkipDeleted,
}

/// Counters for one merge pass over a remote snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub processed: usize,
    pub inserted: usize,
    pub merged: usize,
    pub skipped_deleted: usize,
}

impl MergeReport {
    /// True when the pass wrote anything to the store.
    pub fn changed(&self) -> bool {
        self.inserted > 0 || self.merged > 0
    }
}

/// Decides how a single remote record lands locally.
///
/// Field rules for an existing record: `username` always follows the
/// remote; `company`, `address` and `website` are filled only when the
/// local record has none; `name`, `email` and `phone` keep their local
/// values even when those are empty. Soft-deleted records are never
/// revived.
pub fn merge_user(local: Option<&User>, mut remote: User) -> MergeOutcome {
    match local {
        None => {
            // A fresh insert is clean, whatever the payload claims
            remote.is_deleted = false;
            remote.is_local_only = false;
            MergeOutcome::Insert(remote)
        }
        Some(local) if local.is_deleted => MergeOutcome::SkipDeleted,
        Some(local) => {
            let mut merged = local.clone();
            merged.username = remote.username;
            if merged.company.is_none() {
                merged.company = remote.company;
            }
            if merged.address.is_none() {
                merged.address = remote.address;
            }
            if merged.website.is_empty() {
                merged.website = remote.website;
            }
            MergeOutcome::Merge(merged)
        }
    }
}

/// Merges remote snapshots into the local store.
pub struct Reconciler<'a> {
    repo: &'a UserRepository,
}

impl<'a> Reconciler<'a> {
    pub fn new(repo: &'a UserRepository) -> Self {
        Self { repo }
    }

    /// Merges a remote snapshot into the local store and reports what
    /// happened. The planned writes land as a single batch, so a failed
    /// merge leaves the store untouched. A record repeated within the
    /// snapshot merges against the earlier occurrence's result.
    pub async fn merge_remote(&self, remote: Vec<User>) -> Result<MergeReport, sqlx::Error> {
        let mut report = MergeReport::default();
        let mut batch: Vec<User> = Vec::with_capacity(remote.len());

        for user in remote {
            report.processed += 1;
            // A snapshot can repeat an id; later occurrences see the
            // already planned record, as if applied one at a time
            let planned_idx = batch.iter().position(|u| u.id == user.id);
            let local = match planned_idx {
                Some(idx) => Some(batch[idx].clone()),
                None => self.repo.get_by_id(user.id).await?,
            };
            match merge_user(local.as_ref(), user) {
                MergeOutcome::Insert(user) => {
                    report.inserted += 1;
                    batch.push(user);
                }
                MergeOutcome::Merge(user) => {
                    report.merged += 1;
                    match planned_idx {
                        Some(idx) => batch[idx] = user,
                        None => batch.push(user),
                    }
                }
                MergeOutcome::SkipDeleted => {
                    report.skipped_deleted += 1;
                }
            }
        }

        if !batch.is_empty() {
            self.repo.upsert_many(&batch).await?;
        }

        tracing::info!(
            "Merged {} remote user(s): {} new, {} updated, {} skipped",
            report.processed,
            report.inserted,
            report.merged,
            report.skipped_deleted
        );

        Ok(report)
    }
}
