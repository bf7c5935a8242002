//! Summary of a finished run.

use chrono::TimeDelta;
use serde::Serialize;

use pipeline::{IssueNumber, Release, ReleaseTag, RunId, Timestamp, UploadedAsset, VersionDescriptor};

use crate::WorkflowKind;

/// Whether the closing comment reached its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// The workflow does not notify anyone.
    Skipped,
    /// The comment was posted.
    Posted {
        /// Issue or pull request that received the comment.
        target: IssueNumber,
    },
    /// The comment could not be posted. The release itself is complete.
    Failed {
        /// Issue or pull request the comment was meant for.
        target: IssueNumber,
        /// Why posting failed.
        error: String,
    },
}

/// What a successful run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Correlates the report with the run's tracing spans.
    pub run_id: RunId,
    /// Which workflow ran, with its argument.
    pub workflow: WorkflowKind,
    /// Version written to the manifest.
    pub version: VersionDescriptor,
    /// `{name}-{code}` tag used for the commit and the release.
    pub tag: ReleaseTag,
    /// `None` for the version-bump workflow.
    pub release: Option<Release>,
    /// Uploaded assets, in upload order.
    pub assets: Vec<UploadedAsset>,
    /// Outcome of the closing comment.
    pub notification: NotificationOutcome,
    /// When the run began, before the lookup step.
    pub started_at: Timestamp,
    /// When the last step completed.
    pub finished_at: Timestamp,
}

impl RunReport {
    /// Whether anything about the run needs a human's attention.
    pub fn has_warnings(&self) -> bool {
        matches!(self.notification, NotificationOutcome::Failed { .. })
    }

    /// Wall-clock time the run took.
    pub fn duration(&self) -> TimeDelta {
        self.finished_at.as_datetime() - self.started_at.as_datetime()
    }
}
