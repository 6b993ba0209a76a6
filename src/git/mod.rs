//! Git operations abstraction layer
//!
//! The packaging repositories (RPM spec repo, Debian packaging repo) and the
//! upstream source repository are all driven through the [Repository] trait.
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: a mock implementation for testing
//!
//! ```rust
//! # use obs_release::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> obs_release::Result<()> {
//! repo.checkout("1.28")?;
//! let commit = repo.rev_parse("v1.28.3")?;
//! # let _ = commit;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::Path;

/// Version-control operations used by the bump flows
///
/// ## Error Handling
///
/// Implementations map underlying errors (like `git2::Error`) to
/// [crate::error::ReleaseError] variants.
pub trait Repository {
    /// Root of the working tree
    fn workdir(&self) -> &Path;

    /// Check out a branch, tag or commit.
    ///
    /// A branch that only exists on `origin` is created locally first.
    fn checkout(&self, reference: &str) -> Result<()>;

    /// Resolve a reference to the full hash of the commit it points at.
    ///
    /// Annotated tags are peeled to their commit.
    fn rev_parse(&self, reference: &str) -> Result<String>;

    /// Stage a file; `path` may be absolute inside the work tree or relative
    /// to it
    fn add(&self, path: &Path) -> Result<()>;

    /// Commit the index on top of HEAD with the configured user identity
    fn commit(&self, message: &str) -> Result<()>;
}
