//! Finding the pull request a release belongs to.
//!
//! Pull requests are matched on their description. A lookup must resolve to
//! exactly one pull request: none is [`PublishError::LookupNotFound`], more
//! than one is [`PublishError::AmbiguousLookup`]. Nothing is picked silently.

use crate::{IssueNumber, PublishError, PullRequest, VersionName};

/// What a pull request's description must contain to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestQuery {
    /// The description references `#N` (and not `#N0`, `#N1`, ...).
    ReferencesIssue(IssueNumber),
    /// The description, ignoring leading whitespace, starts with the marker.
    DescriptionStartsWith(String),
}

impl PullRequestQuery {
    /// Query for the release pull request of `version`, e.g. `"Release 3.0.0"`.
    pub fn release_marker(prefix: &str, version: VersionName) -> Self {
        PullRequestQuery::DescriptionStartsWith(format!("{prefix}{version}"))
    }

    /// Whether `pr` satisfies the query. Pull requests without a description
    /// never match.
    pub fn matches(&self, pr: &PullRequest) -> bool {
        let Some(body) = pr.body.as_deref() else {
            return false;
        };
        match self {
            PullRequestQuery::ReferencesIssue(issue) => references_issue(body, *issue),
            // The version must end at the marker: `Release 3.0.1` is not a
            // prefix match for `Release 3.0.10` or `Release 3.0.1.5`.
            PullRequestQuery::DescriptionStartsWith(marker) => body
                .trim_start()
                .strip_prefix(marker.as_str())
                .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_digit() || c == '.')),
        }
    }

    /// Human-readable description used in errors and logs.
    pub fn describe(&self) -> String {
        match self {
            PullRequestQuery::ReferencesIssue(issue) => format!("issue #{issue}"),
            PullRequestQuery::DescriptionStartsWith(marker) => format!("marker '{marker}'"),
        }
    }
}

fn references_issue(body: &str, issue: IssueNumber) -> bool {
    let needle = format!("#{issue}");
    body.match_indices(&needle).any(|(at, _)| {
        !body[at + needle.len()..].starts_with(|c: char| c.is_ascii_digit())
    })
}

/// Returns the single pull request matching `query`.
pub fn find_unique(
    query: &PullRequestQuery,
    pull_requests: impl IntoIterator<Item = PullRequest>,
) -> Result<PullRequest, PublishError> {
    let mut matches: Vec<PullRequest> = pull_requests
        .into_iter()
        .filter(|pr| query.matches(pr))
        .collect();

    match matches.len() {
        0 => Err(PublishError::LookupNotFound {
            criterion: query.describe(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(PublishError::AmbiguousLookup {
            criterion: query.describe(),
            candidates: matches.iter().map(|pr| pr.number).collect(),
        }),
    }
}
