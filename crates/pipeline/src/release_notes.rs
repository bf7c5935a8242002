//! Text templates for commits, release records, and notifications.

use crate::{CommitRecord, Issue, ReleaseTag};

/// Commit-message prefixes that mark automated commits.
///
/// Commits starting with either are left out of release notes: version bumps
/// are produced by this tool, merges carry no human-authored change.
pub const RESERVED_COMMIT_PREFIXES: [&str; 2] = ["Update build version", "Merge remote-tracking"];

/// Message of the commit that records a version bump.
pub fn bump_commit_message(tag: &ReleaseTag) -> String {
    format!("Update build version to {tag}")
}

/// Drops automated commits, keeping the relative order of the rest.
pub fn filter_commits(commits: impl IntoIterator<Item = CommitRecord>) -> Vec<CommitRecord> {
    commits
        .into_iter()
        .filter(|c| {
            !RESERVED_COMMIT_PREFIXES
                .iter()
                .any(|prefix| c.message.starts_with(prefix))
        })
        .collect()
}

/// Body of a pre-release: the issue it was built for, then the changes.
///
/// Each commit contributes one line, `- {sha} {summary}`, where the summary is
/// the first line of the message.
pub fn issue_release_body(issue: &Issue, commits: &[CommitRecord]) -> String {
    let changes = commits
        .iter()
        .map(|c| {
            let summary = c.message.lines().next().unwrap_or_default();
            format!("- {} {}", c.id, summary)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "## Issue\n[#{number}]({url}) {title}\n\n## Changes\n{changes}\n",
        number = issue.number,
        url = issue.html_url,
        title = issue.title,
    )
}

/// Display name of a pre-release.
pub fn prerelease_name(tag: &ReleaseTag) -> String {
    format!("Build {tag}")
}

/// Display name of a final release.
pub fn final_release_name(tag: &ReleaseTag) -> String {
    format!("Release {tag}")
}

/// Comment posted once a build is available.
pub fn release_comment(tag: &ReleaseTag, release_url: &str) -> String {
    format!("Available to test in Build [{tag}]({release_url})")
}
