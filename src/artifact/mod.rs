//! Artifact selection
//!
//! Decides which built distributables in an artifact directory a release
//! task acts on.

mod selector;

pub use selector::{ArtifactDirectory, ArtifactEntry, ArtifactFilter, SelectionMode, select};
