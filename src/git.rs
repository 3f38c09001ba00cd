//! Commit source backed by a local git repository.

use std::path::Path;

use git2::{Oid, ReferenceType, Repository, Sort};
use tracing::debug;

use crate::commit::{Commit, CommitSource, CommitSourceError, Committer};
use crate::refs::{is_zero_hash, RefChange, RefChangeType};

/// Finds the commits a ref change introduces to a git repository.
pub struct GitCommitSource {
    repo: Repository,
}

impl GitCommitSource {
    /// Opens the repository at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CommitSourceError> {
        let repo = Repository::open(path)?;
        Ok(Self { repo })
    }

    /// Opens the repository described by the environment.
    ///
    /// Honors `GIT_DIR` and the object directory variables git sets for
    /// hooks, so objects still in the push quarantine are visible.
    pub fn open_from_env() -> Result<Self, CommitSourceError> {
        let repo = Repository::open_from_env()?;
        Ok(Self { repo })
    }

    /// Wraps an already open repository.
    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    fn parse_oid(hash: &str) -> Result<Oid, CommitSourceError> {
        Oid::from_str(hash).map_err(|_| CommitSourceError::InvalidObjectId(hash.to_string()))
    }

    /// Resolves `hash` to a commit, peeling annotated tags.
    fn commit_oid(&self, hash: &str) -> Result<Oid, CommitSourceError> {
        let object = self.repo.find_object(Self::parse_oid(hash)?, None)?;
        Ok(object.peel_to_commit()?.id())
    }

    /// Hides every commit reachable from refs other than `ref_id`.
    fn hide_other_refs(&self, walk: &mut git2::Revwalk<'_>, ref_id: &str) -> Result<(), CommitSourceError> {
        for reference in self.repo.references()? {
            let reference = reference?;
            if reference.kind() == Some(ReferenceType::Symbolic) || reference.name() == Some(ref_id) {
                continue;
            }
            // Refs to trees or blobs reach no commits.
            if let Ok(commit) = reference.peel_to_commit() {
                walk.hide(commit.id())?;
            }
        }
        Ok(())
    }
}

impl CommitSource for GitCommitSource {
    fn new_commits(&self, ref_change: &RefChange) -> Result<Vec<Commit>, CommitSourceError> {
        if ref_change.change_type == RefChangeType::Delete {
            return Ok(Vec::new());
        }

        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        walk.push(self.commit_oid(&ref_change.to_hash)?)?;

        if !is_zero_hash(&ref_change.from_hash) {
            walk.hide(self.commit_oid(&ref_change.from_hash)?)?;
        }
        self.hide_other_refs(&mut walk, &ref_change.ref_id)?;

        let mut commits = Vec::new();
        for oid in walk {
            let commit = self.repo.find_commit(oid?)?;
            let committer = commit.committer();
            commits.push(Commit {
                id: commit.id().to_string(),
                message: String::from_utf8_lossy(commit.message_bytes())
                    .trim_end_matches(['\n', '\r'])
                    .to_string(),
                is_merge: commit.parent_count() > 1,
                committer: Committer {
                    name: String::from_utf8_lossy(committer.name_bytes()).into_owned(),
                    email_address: String::from_utf8_lossy(committer.email_bytes()).into_owned(),
                },
            });
        }

        debug!(ref_id = %ref_change.ref_id, count = commits.len(), "Walked new commits");
        Ok(commits)
    }
}
