//! Core domain for the Android release publisher.
//!
//! This crate contains every domain concept, newtype identifier, value type,
//! text template, and error type used by the publishing workflows, plus the
//! port traits infrastructure crates implement. It never talks to the network,
//! spawns processes, or touches the file system.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate defines *what* is needed;
//! `github` and `toolchain` define *how* to supply it, and `workflow` sequences
//! the calls.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`IssueNumber`, `ReleaseId`, `RunId`, etc.) |
//! | [`types`] | Value types (`VersionName`, `ReleaseTag`, `BuildOutcome`, etc.) |
//! | [`records`] | Remote records (`PullRequest`, `Issue`, `Release`, etc.) |
//! | [`manifest`] | Manifest text format trait and pattern-based implementations |
//! | [`release_notes`] | Commit filtering and release/comment text |
//! | [`lookup`] | Linked pull request matching |
//! | [`config`] | `PublisherConfig` and its sections |
//! | [`ports`] | Traits implemented by infrastructure crates |
//! | [`errors`] | `PublishError` taxonomy and component errors |

pub mod config;
pub mod errors;
pub mod identifiers;
pub mod lookup;
pub mod manifest;
pub mod ports;
pub mod records;
pub mod release_notes;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{
    ApiToken, BuildConfig, GithubConfig, PublisherConfig, ReleaseConfig, VcsConfig,
    VersioningConfig,
};
pub use errors::{HostError, ManifestError, PublishError};
pub use identifiers::{
    AssetId, AssetName, BranchName, CommitSha, IssueNumber, PullRequestNumber, ReleaseId, RunId,
    VariableName,
};
pub use lookup::{find_unique, PullRequestQuery};
pub use manifest::{ManifestFormat, ManifestSyntax, PatternFormat};
pub use ports::{
    BuildTool, IssueTracker, ManifestEditor, PullRequestManager, ReleaseManager,
    RepositoryVariables, VersionControl,
};
pub use records::{Issue, NewRelease, PullRequest, PullRequestState, Release, UploadedAsset};
pub use types::{
    ArtifactKind, BuildOutcome, BuildType, CommitRecord, OutputLine, OutputObserver, OutputStream,
    ParseVersionNameError, ProgressObserver, ReleaseTag, Timestamp, UploadProgress, VersionCode,
    VersionDescriptor, VersionName,
};
