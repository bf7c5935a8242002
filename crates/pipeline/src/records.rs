//! Records exchanged with the source-hosting service.
//!
//! These are the domain's view of remote objects: only the fields the
//! workflows read are modelled. Wire formats live in the `github` crate.

use serde::{Deserialize, Serialize};

use crate::{AssetId, AssetName, BranchName, IssueNumber, PullRequestNumber, ReleaseId, ReleaseTag};

/// Pull request list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    /// Open pull requests only.
    #[default]
    Open,
    /// Closed and merged pull requests only.
    Closed,
    /// Every pull request.
    All,
}

impl PullRequestState {
    /// The value GitHub expects in the `state` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            PullRequestState::Open => "open",
            PullRequestState::Closed => "closed",
            PullRequestState::All => "all",
        }
    }
}

/// A pull request summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request number.
    pub number: PullRequestNumber,
    /// Title.
    pub title: String,
    /// Description; `None` when the author left it empty.
    pub body: Option<String>,
    /// Browser URL.
    pub html_url: String,
}

/// An issue summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number.
    pub number: IssueNumber,
    /// Title.
    pub title: String,
    /// Browser URL.
    pub html_url: String,
}

/// Parameters of a release to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
    /// Git tag; created by GitHub on `target` if it does not exist.
    pub tag: ReleaseTag,
    /// Display name.
    pub name: String,
    /// Markdown body.
    pub body: String,
    /// Whether the release is flagged as not production-ready.
    pub prerelease: bool,
    /// Branch the tag is created from.
    pub target: BranchName,
}

/// A release record as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Numeric release id.
    pub id: ReleaseId,
    /// Tag name.
    pub tag_name: String,
    /// Browser URL of the release page.
    pub html_url: String,
}

/// An asset attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    /// Numeric asset id.
    pub id: AssetId,
    /// Asset file name.
    pub name: AssetName,
    /// Upload state reported by GitHub (`"uploaded"` once complete).
    pub state: String,
    /// Public download URL.
    pub download_url: String,
}

impl UploadedAsset {
    /// Whether GitHub reports the asset as fully uploaded.
    pub fn is_uploaded(&self) -> bool {
        self.state == "uploaded"
    }
}
