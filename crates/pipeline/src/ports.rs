//! Port traits implemented by infrastructure crates.
//!
//! The orchestrator in `workflow` depends only on these traits. The `github`
//! crate implements the four source-hosting ports; the `toolchain` crate
//! implements the manifest, version-control, and build ports. Tests substitute
//! in-memory fakes.
//!
//! Source-hosting ports return [`HostError`]; the orchestrator decides which
//! [`PublishError`] variant a failure becomes, since the same call can mean
//! different things at different steps. Local ports return [`PublishError`]
//! directly.

use std::path::Path;

use async_trait::async_trait;

use crate::{
    AssetName, BuildOutcome, BuildType, CommitRecord, HostError, Issue, IssueNumber, NewRelease,
    OutputObserver, ProgressObserver, PublishError, PullRequest, PullRequestNumber,
    PullRequestState, Release, ReleaseId, UploadedAsset, VariableName, VersionDescriptor,
};

// ---------------------------------------------------------------------------
// Source-hosting ports
// ---------------------------------------------------------------------------

/// Repository-scoped key/value variables.
#[async_trait]
pub trait RepositoryVariables: Send + Sync {
    /// Returns the current raw value of `name`.
    async fn get_variable(&self, name: &VariableName) -> Result<String, HostError>;

    /// Overwrites the value of `name`.
    async fn update_variable(&self, name: &VariableName, value: &str) -> Result<(), HostError>;
}

/// Issue reads and comments.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetches one issue.
    async fn get_issue(&self, number: IssueNumber) -> Result<Issue, HostError>;

    /// Appends a comment to an issue (or pull request).
    async fn create_comment(&self, number: IssueNumber, body: &str) -> Result<(), HostError>;
}

/// Pull request queries.
#[async_trait]
pub trait PullRequestManager: Send + Sync {
    /// Lists pull requests in `state`, most recently created first.
    async fn list_pull_requests(
        &self,
        state: PullRequestState,
    ) -> Result<Vec<PullRequest>, HostError>;

    /// Lists the commits of one pull request in history order.
    async fn list_commits(&self, number: PullRequestNumber)
        -> Result<Vec<CommitRecord>, HostError>;
}

/// Release records and their assets.
#[async_trait]
pub trait ReleaseManager: Send + Sync {
    /// Creates a release; fails if the tag already has one.
    async fn create_release(&self, release: &NewRelease) -> Result<Release, HostError>;

    /// Fetches a release by id.
    async fn get_release(&self, id: ReleaseId) -> Result<Release, HostError>;

    /// Streams the file at `path` to the release as `name`.
    ///
    /// `progress`, when given, is called as bytes are handed to the transport.
    async fn upload_asset(
        &self,
        id: ReleaseId,
        path: &Path,
        name: &AssetName,
        progress: Option<ProgressObserver>,
    ) -> Result<UploadedAsset, HostError>;
}

// ---------------------------------------------------------------------------
// Local ports
// ---------------------------------------------------------------------------

/// Reads and rewrites the version fields of a manifest file.
pub trait ManifestEditor: Send + Sync {
    /// Extracts the version descriptor from the file at `path`.
    fn read(&self, path: &Path) -> Result<VersionDescriptor, PublishError>;

    /// Rewrites both version fields in place, leaving all other content intact.
    fn write(&self, path: &Path, descriptor: &VersionDescriptor) -> Result<(), PublishError>;
}

/// Records and publishes the manifest change.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Commits exactly `path` with `message`.
    async fn commit(&self, path: &Path, message: &str) -> Result<(), PublishError>;

    /// Pushes the current branch.
    async fn push(&self) -> Result<(), PublishError>;
}

/// Runs the external build tool to completion.
#[async_trait]
pub trait BuildTool: Send + Sync {
    /// Runs the tasks for `build_type` and waits for the process to exit.
    ///
    /// A non-zero exit is reported through [`BuildOutcome`], not as an error;
    /// errors mean the process could not be started or observed.
    async fn build(
        &self,
        build_type: BuildType,
        observer: Option<OutputObserver>,
    ) -> Result<BuildOutcome, PublishError>;
}
