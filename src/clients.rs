//! Clients for the version control tools the workflows drive.
//!
//! - [`git`]: Git operations in one working tree (branches, stash, commit, `git cl upload`)
//! - [`repo`]: Android `repo` operations (start, upload, abandon)
//!
//! Every client is bound to an explicit working directory; nothing here changes
//! the process-wide current directory.

pub mod git;
pub mod repo;
