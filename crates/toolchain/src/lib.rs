//! Local-tool infrastructure adapter for the release publisher.
//!
//! Implements the file, version-control, and build ports defined in
//! `pipeline` by touching the checkout on disk and spawning processes.
//!
//! ## Architectural Layer
//!
//! **Infrastructure adapter.** Nothing here decides what happens next; every
//! type reports an outcome and the `workflow` crate acts on it.
//!
//! | Type | Port | Backed by |
//! |------|------|-----------|
//! | [`FileManifestEditor`] | `ManifestEditor` | the manifest file plus a `ManifestFormat` |
//! | [`GitCommitter`] | `VersionControl` | `git commit`, then the push script or `git push` |
//! | [`GradleRunner`] | `BuildTool` | the Gradle wrapper, output streamed line by line |

mod git;
mod gradle;
mod manifest;

pub use git::GitCommitter;
pub use gradle::GradleRunner;
pub use manifest::FileManifestEditor;
