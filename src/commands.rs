//! The per-target workflows and the command that runs them.
//!
//! - [`add`]: Runs every requested target and prints the review summary
//! - [`android`]: `repo` based workflow for an Android checkout
//! - [`chromium`]: `git cl` based workflow for a Chromium checkout
//! - [`google3`]: Delegates to the Google3 flag registrar

pub mod add;
pub mod android;
pub mod chromium;
pub mod google3;
