//! GitHub infrastructure adapter for the release publisher.
//!
//! Implements the source-hosting traits defined in the [`pipeline`] crate
//! (`RepositoryVariables`, `IssueTracker`, `PullRequestManager`,
//! `ReleaseManager`) over the GitHub REST API with `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. URL layout,
//! authentication headers, wire formats, and upload streaming are handled
//! here; the [`pipeline`] crate never sees them.
//!
//! ## Endpoints
//!
//! | Port method | Request |
//! |-------------|---------|
//! | `get_variable` / `update_variable` | `GET` / `PATCH /repos/{o}/{r}/actions/variables/{name}` |
//! | `get_issue` | `GET /repos/{o}/{r}/issues/{n}` |
//! | `create_comment` | `POST /repos/{o}/{r}/issues/{n}/comments` |
//! | `list_pull_requests` | `GET /repos/{o}/{r}/pulls?state=&per_page=50` |
//! | `list_commits` | `GET /repos/{o}/{r}/pulls/{n}/commits` |
//! | `create_release` / `get_release` | `POST /repos/{o}/{r}/releases`, `GET .../releases/{id}` |
//! | `upload_asset` | `POST {uploads}/repos/{o}/{r}/releases/{id}/assets?name=` |
//!
//! No call is retried. Non-success responses become
//! [`pipeline::HostError::Status`] with the response body attached.

mod client;
mod wire;

pub use client::{GithubClient, API_VERSION, PULL_REQUEST_PAGE_SIZE};
