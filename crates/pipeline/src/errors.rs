//! Error types for the publisher domain.
//!
//! [`PublishError`] is the run-level taxonomy: every variant is fatal to the
//! current run and names the step that failed. Component-level errors
//! ([`HostError`] for GitHub calls, [`ManifestError`] for manifest text) are
//! wrapped into the variant of the step that produced them, so the caller can
//! always tell *where* a run stopped as well as *why*.
//!
//! There is no retry classification. A failed run leaves earlier side effects
//! (counter incremented, commit pushed) in place and an operator reconciles
//! state by hand before rerunning.

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    AssetName, IssueNumber, ParseVersionNameError, PullRequestNumber, ReleaseTag, VariableName,
};

// ---------------------------------------------------------------------------
// Infrastructure errors
// ---------------------------------------------------------------------------

/// Failure of a single call against the source-hosting API.
#[derive(Debug, Error)]
pub enum HostError {
    /// The request never produced a response (DNS, TLS, connection reset, ...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    ///
    /// `body` is the response text captured on a best-effort basis for
    /// diagnostics; it is empty when the body could not be read.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// A local file needed for the request could not be read.
    #[error("cannot read {path}: {reason}")]
    LocalFile {
        /// File that failed to open or read.
        path: PathBuf,
        /// Underlying I/O error text.
        reason: String,
    },
}

/// Failure to extract or patch version fields in manifest text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    /// The named field does not appear in the canonical `key="value"` shape.
    #[error("field '{field}' not found")]
    FieldMissing {
        /// Field name, e.g. `"versionCode"`.
        field: &'static str,
    },

    /// The `versionName` value is not a dotted triple.
    #[error(transparent)]
    InvalidVersionName(#[from] ParseVersionNameError),

    /// The `versionCode` value does not fit a 64-bit unsigned integer.
    #[error("versionCode '{value}' is not a valid integer")]
    InvalidVersionCode {
        /// The rejected value.
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Run-level errors
// ---------------------------------------------------------------------------

/// Errors that abort a publisher run.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A required command-line argument was not supplied.
    #[error("missing argument: {name}")]
    MissingArgument {
        /// Argument name as shown in usage text.
        name: String,
    },

    /// The build counter could not be read (or did not hold an integer).
    #[error("couldn't read variable {variable}: {reason}")]
    RemoteRead {
        /// Counter variable name.
        variable: VariableName,
        /// What went wrong.
        reason: String,
    },

    /// The incremented build counter could not be written back.
    #[error("couldn't update variable {variable}: {reason}")]
    RemoteWrite {
        /// Counter variable name.
        variable: VariableName,
        /// What went wrong.
        reason: String,
    },

    /// The manifest did not contain a usable version field.
    #[error("cannot parse manifest {path}: {source}")]
    ManifestParse {
        /// Manifest file.
        path: PathBuf,
        /// Which field was missing or malformed.
        #[source]
        source: ManifestError,
    },

    /// A `git` command or the push helper exited non-zero or could not start.
    #[error("`{command}` failed: {stderr}")]
    VcsCommand {
        /// The command line that failed.
        command: String,
        /// Captured standard error (or the spawn error).
        stderr: String,
    },

    /// The build tool exited with a non-zero code.
    #[error("build failed with exit code {exit_code}")]
    BuildFailure {
        /// Exit code reported by the build process.
        exit_code: i32,
    },

    /// The release record could not be created (duplicate tag, rejection, ...).
    #[error("cannot create release {tag}: {source}")]
    ReleaseCreation {
        /// Tag the release was requested under.
        tag: ReleaseTag,
        /// Underlying API failure.
        #[source]
        source: HostError,
    },

    /// A binary asset could not be uploaded to the release.
    #[error("cannot upload asset {asset}: {source}")]
    AssetUpload {
        /// Asset name.
        asset: AssetName,
        /// Underlying API failure, including the remote error body.
        #[source]
        source: HostError,
    },

    /// No pull request matched the lookup criterion.
    #[error("cannot find linked pull request for {criterion}")]
    LookupNotFound {
        /// Human-readable description of what was searched for.
        criterion: String,
    },

    /// More than one pull request matched the lookup criterion.
    #[error("{criterion} matches several pull requests: {candidates:?}")]
    AmbiguousLookup {
        /// Human-readable description of what was searched for.
        criterion: String,
        /// Every matching pull request number.
        candidates: Vec<PullRequestNumber>,
    },

    /// The notification comment could not be posted.
    #[error("cannot comment on #{issue}: {source}")]
    Notification {
        /// Issue (or pull request) the comment targeted.
        issue: IssueNumber,
        /// Underlying API failure.
        #[source]
        source: HostError,
    },

    /// A read-only query against the source-hosting API failed.
    #[error("{operation} failed: {source}")]
    Remote {
        /// Name of the failed operation, e.g. `"list pull requests"`.
        operation: &'static str,
        /// Underlying API failure.
        #[source]
        source: HostError,
    },

    /// Configuration is invalid; produced before any side effect.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// A local file-system or process operation failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl PublishError {
    /// Convenience constructor for [`PublishError::Io`].
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        PublishError::Io {
            context: context.into(),
            source,
        }
    }
}
