use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Mock repository for testing without actual git operations
///
/// The work tree is a real directory so flows can patch files in it;
/// references, staging and commits are only recorded.
pub struct MockRepository {
    workdir: PathBuf,
    refs: HashMap<String, String>,
    head: RefCell<Option<String>>,
    checkouts: RefCell<Vec<String>>,
    staged: RefCell<Vec<PathBuf>>,
    commits: RefCell<Vec<String>>,
}

impl MockRepository {
    /// Create a mock repository rooted at `workdir`
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        MockRepository {
            workdir: workdir.into(),
            refs: HashMap::new(),
            head: RefCell::new(None),
            checkouts: RefCell::new(Vec::new()),
            staged: RefCell::new(Vec::new()),
            commits: RefCell::new(Vec::new()),
        }
    }

    /// Add a branch or tag pointing to a commit hash
    pub fn add_ref(&mut self, name: impl Into<String>, commit: impl Into<String>) {
        self.refs.insert(name.into(), commit.into());
    }

    /// Reference most recently checked out
    pub fn head(&self) -> Option<String> {
        self.head.borrow().clone()
    }

    pub fn checkouts(&self) -> Vec<String> {
        self.checkouts.borrow().clone()
    }

    pub fn staged(&self) -> Vec<PathBuf> {
        self.staged.borrow().clone()
    }

    pub fn commits(&self) -> Vec<String> {
        self.commits.borrow().clone()
    }
}

fn not_found(reference: &str) -> ReleaseError {
    ReleaseError::Git(git2::Error::from_str(&format!(
        "revspec '{}' not found",
        reference
    )))
}

impl Repository for MockRepository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        if !self.refs.contains_key(reference) {
            return Err(not_found(reference));
        }
        self.checkouts.borrow_mut().push(reference.to_string());
        *self.head.borrow_mut() = Some(reference.to_string());
        Ok(())
    }

    fn rev_parse(&self, reference: &str) -> Result<String> {
        self.refs
            .get(reference)
            .cloned()
            .ok_or_else(|| not_found(reference))
    }

    fn add(&self, path: &Path) -> Result<()> {
        let relative = path.strip_prefix(&self.workdir).unwrap_or(path);
        self.staged.borrow_mut().push(relative.to_path_buf());
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.commits.borrow_mut().push(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_refs() {
        let mut repo = MockRepository::new("/tmp/upstream");
        repo.add_ref("v1.28.3", "abc123");

        assert_eq!(repo.rev_parse("v1.28.3").unwrap(), "abc123");
        assert!(repo.rev_parse("v2.0.0").is_err());
    }

    #[test]
    fn test_mock_repository_checkout_tracks_head() {
        let mut repo = MockRepository::new("/tmp/rpm");
        repo.add_ref("1.28", "abc");
        repo.add_ref("main", "def");

        repo.checkout("1.28").unwrap();
        repo.checkout("main").unwrap();
        assert_eq!(repo.head().as_deref(), Some("main"));
        assert_eq!(repo.checkouts(), vec!["1.28", "main"]);
        assert!(repo.checkout("1.99").is_err());
    }

    #[test]
    fn test_mock_repository_add_relative() {
        let repo = MockRepository::new("/tmp/rpm");
        repo.add(Path::new("/tmp/rpm/cri-o.spec")).unwrap();
        repo.commit("bump").unwrap();
        assert_eq!(repo.staged(), vec![PathBuf::from("cri-o.spec")]);
        assert_eq!(repo.commits(), vec!["bump"]);
    }
}
