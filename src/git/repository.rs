use crate::error::{ReleaseError, Result};
use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, Repository as Git2Repo};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    workdir: PathBuf,
}

impl Git2Repository {
    /// Open an existing repository at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::open(path.as_ref())?;
        Self::from_git2(repo)
    }

    /// Open the repository at `path`, cloning `url` there first if needed
    pub fn clone_or_open<P: AsRef<Path>>(path: P, url: &str) -> Result<Self> {
        let path = path.as_ref();
        if path.join(".git").exists() {
            debug!(path = %path.display(), "opening existing clone");
            return Self::open(path);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ReleaseError::fs(parent, e))?;
        }
        info!(url, path = %path.display(), "cloning repository");
        let repo = Git2Repo::clone(url, path)?;
        Self::from_git2(repo)
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Result<Self> {
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| ReleaseError::config("bare repositories are not supported"))?;
        Ok(Git2Repository { repo, workdir })
    }

    fn ensure_local_branch(&self, name: &str) -> Result<()> {
        if self.repo.find_branch(name, BranchType::Local).is_ok() {
            return Ok(());
        }

        let remote_name = format!("origin/{}", name);
        let remote = match self.repo.find_branch(&remote_name, BranchType::Remote) {
            Ok(remote) => remote,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let commit = remote.get().peel_to_commit()?;
        let mut local = self.repo.branch(name, &commit, false)?;
        local.set_upstream(Some(&remote_name))?;
        debug!(branch = name, "created local tracking branch");
        Ok(())
    }
}

impl super::Repository for Git2Repository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        self.ensure_local_branch(reference)?;

        let (object, resolved) = self.repo.revparse_ext(reference)?;
        self.repo
            .checkout_tree(&object, Some(CheckoutBuilder::new().safe()))?;

        match resolved.as_ref().and_then(|r| r.name()) {
            Some(name) if name.starts_with("refs/heads/") => self.repo.set_head(name)?,
            _ => self.repo.set_head_detached(object.peel_to_commit()?.id())?,
        }

        info!(reference, path = %self.workdir.display(), "checked out");
        Ok(())
    }

    fn rev_parse(&self, reference: &str) -> Result<String> {
        let commit = self.repo.revparse_single(reference)?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    fn add(&self, path: &Path) -> Result<()> {
        let relative = path.strip_prefix(&self.workdir).unwrap_or(path);
        let mut index = self.repo.index()?;
        index.add_path(relative)?;
        index.write()?;
        debug!(path = %relative.display(), "staged");
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        let mut index = self.repo.index()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.repo.signature()?;
        let parent = self.repo.head()?.peel_to_commit()?;

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;
        info!(commit = %oid, message, "committed");
        Ok(())
    }
}
