//! The publishing workflow.
//!
//! Every workflow runs the same step sequence, with later steps skipped when
//! the workflow does not need them:
//!
//! ```text
//! lookup -> versioning -> editing -> committing -> building
//!        -> publishing -> uploading -> notifying -> done
//! ```
//!
//! The first failing step aborts the run. Nothing already done is undone: a
//! failed build leaves the incremented counter and the pushed bump commit in
//! place. The one exception is notifying, whose failure is logged and
//! recorded in the [`RunReport`] while the run still succeeds.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};

use pipeline::release_notes::{
    bump_commit_message, filter_commits, final_release_name, issue_release_body, prerelease_name,
    release_comment,
};
use pipeline::{
    find_unique, BuildTool, BuildType, IssueNumber, IssueTracker, ManifestEditor, NewRelease,
    OutputObserver, ProgressObserver, PublishError, PublisherConfig, PullRequest,
    PullRequestManager, PullRequestQuery, Release, ReleaseManager, ReleaseTag,
    RepositoryVariables, RunId, Timestamp, UploadedAsset, VersionCode, VersionControl,
    VersionDescriptor, VersionName,
};

use crate::{NotificationOutcome, RunReport, VersionCounter};

/// Which workflow to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    /// Test build for an issue: assemble, pre-release, comment on the issue.
    PreRelease(IssueNumber),
    /// Store build for an explicit version: bundle and assemble, release,
    /// comment on the release pull request.
    FinalRelease(VersionName),
    /// Bump the counter and manifest, commit and push, nothing else.
    VersionBump(Option<VersionName>),
}

impl WorkflowKind {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowKind::PreRelease(_) => "prerelease",
            WorkflowKind::FinalRelease(_) => "release",
            WorkflowKind::VersionBump(_) => "bump",
        }
    }

    /// The version name the operator asked for, if any.
    fn requested_version(&self) -> Option<VersionName> {
        match self {
            WorkflowKind::PreRelease(_) => None,
            WorkflowKind::FinalRelease(version) => Some(*version),
            WorkflowKind::VersionBump(version) => *version,
        }
    }
}

/// The port implementations a [`Publisher`] drives.
#[derive(Clone)]
pub struct Ports {
    /// Holds the build counter.
    pub variables: Arc<dyn RepositoryVariables>,
    /// Issue lookup and the closing comment.
    pub issues: Arc<dyn IssueTracker>,
    /// Pull request lookup and release-note commits.
    pub pull_requests: Arc<dyn PullRequestManager>,
    /// Release creation and asset upload.
    pub releases: Arc<dyn ReleaseManager>,
    /// Reads and rewrites the version manifest in the checkout.
    pub manifest: Arc<dyn ManifestEditor>,
    /// Commits the manifest and pushes it.
    pub vcs: Arc<dyn VersionControl>,
    /// Runs the Gradle build.
    pub build: Arc<dyn BuildTool>,
}

/// What the release is published for, resolved by the lookup step.
enum Publication {
    Issue {
        issue: IssueNumber,
        pull_request: PullRequest,
    },
    Version {
        pull_request: PullRequest,
    },
}

impl Publication {
    fn build_type(&self) -> BuildType {
        match self {
            Publication::Issue { .. } => BuildType::Assemble,
            Publication::Version { .. } => BuildType::AssembleAndBundle,
        }
    }

    /// Where the closing comment goes.
    fn comment_target(&self) -> IssueNumber {
        match self {
            Publication::Issue { issue, .. } => *issue,
            Publication::Version { pull_request } => pull_request.number.into(),
        }
    }
}

/// Runs publishing workflows against a set of ports.
pub struct Publisher {
    config: PublisherConfig,
    ports: Ports,
    output_observer: Option<OutputObserver>,
    progress_observer: Option<ProgressObserver>,
}

impl Publisher {
    /// Creates a publisher with no observers attached.
    pub fn new(config: PublisherConfig, ports: Ports) -> Self {
        Self {
            config,
            ports,
            output_observer: None,
            progress_observer: None,
        }
    }

    /// Receives every line the build prints.
    pub fn with_output_observer(mut self, observer: OutputObserver) -> Self {
        self.output_observer = Some(observer);
        self
    }

    /// Receives upload progress for every asset.
    pub fn with_progress_observer(mut self, observer: ProgressObserver) -> Self {
        self.progress_observer = Some(observer);
        self
    }

    /// Runs `kind` to completion or to the first fatal error.
    pub async fn run(&self, kind: WorkflowKind) -> Result<RunReport, PublishError> {
        let run_id = RunId::new_random();
        let span = info_span!("publish", %run_id, workflow = kind.name());
        self.execute(run_id, kind).instrument(span).await
    }

    async fn execute(&self, run_id: RunId, kind: WorkflowKind) -> Result<RunReport, PublishError> {
        let started_at = Timestamp::now();
        info!(?kind, repository = %self.config.repo_slug(), "run started");

        let publication = self.lookup(kind).instrument(info_span!("lookup")).await?;

        let code = VersionCounter::new(
            self.ports.variables.clone(),
            self.config.versioning.counter_variable.clone(),
        )
        .read_and_increment()
        .instrument(info_span!("versioning"))
        .await?;

        let version = info_span!("editing").in_scope(|| self.edit_manifest(kind, code))?;
        let tag = version.tag();

        self.commit_and_push(&tag)
            .instrument(info_span!("committing", %tag))
            .await?;

        let mut report = RunReport {
            run_id,
            workflow: kind,
            version,
            tag: tag.clone(),
            release: None,
            assets: Vec::new(),
            notification: NotificationOutcome::Skipped,
            started_at,
            finished_at: started_at,
        };

        let Some(publication) = publication else {
            report.finished_at = Timestamp::now();
            info!(%tag, "version bumped");
            return Ok(report);
        };
        let build_type = publication.build_type();

        self.build(build_type)
            .instrument(info_span!("building", ?build_type))
            .await?;

        let release = self
            .publish(&publication, &tag)
            .instrument(info_span!("publishing", %tag))
            .await?;

        report.assets = self
            .upload(&release, &tag, build_type)
            .instrument(info_span!("uploading", release_id = %release.id))
            .await?;

        report.notification = self
            .notify(publication.comment_target(), &tag, &release)
            .instrument(info_span!("notifying"))
            .await;
        report.release = Some(release);
        report.finished_at = Timestamp::now();

        info!(
            %tag,
            assets = report.assets.len(),
            duration_ms = report.duration().num_milliseconds(),
            "run finished"
        );
        Ok(report)
    }

    async fn lookup(&self, kind: WorkflowKind) -> Result<Option<Publication>, PublishError> {
        let query = match kind {
            WorkflowKind::PreRelease(issue) => PullRequestQuery::ReferencesIssue(issue),
            WorkflowKind::FinalRelease(version) => {
                PullRequestQuery::release_marker(&self.config.release.release_marker_prefix, version)
            }
            WorkflowKind::VersionBump(_) => return Ok(None),
        };

        let state = self.config.github.pull_request_state;
        let pull_requests = self
            .ports
            .pull_requests
            .list_pull_requests(state)
            .await
            .map_err(|source| PublishError::Remote {
                operation: "list pull requests",
                source,
            })?;

        let pull_request = find_unique(&query, pull_requests)?;
        info!(
            pull_request = %pull_request.number,
            title = %pull_request.title,
            criterion = %query.describe(),
            "found linked pull request"
        );

        Ok(Some(match kind {
            WorkflowKind::PreRelease(issue) => Publication::Issue {
                issue,
                pull_request,
            },
            _ => Publication::Version { pull_request },
        }))
    }

    fn edit_manifest(
        &self,
        kind: WorkflowKind,
        code: VersionCode,
    ) -> Result<VersionDescriptor, PublishError> {
        let path = self.config.manifest_file();
        let current = self.ports.manifest.read(&path)?;
        let name = kind.requested_version().unwrap_or(current.name);
        let updated = VersionDescriptor::new(name, code);
        self.ports.manifest.write(&path, &updated)?;
        info!(
            previous = %current.tag(),
            current = %updated.tag(),
            "manifest version updated"
        );
        Ok(updated)
    }

    async fn commit_and_push(&self, tag: &ReleaseTag) -> Result<(), PublishError> {
        let path = self.config.manifest_file();
        self.ports
            .vcs
            .commit(&path, &bump_commit_message(tag))
            .await?;
        self.ports.vcs.push().await
    }

    async fn build(&self, build_type: BuildType) -> Result<(), PublishError> {
        let outcome = self
            .ports
            .build
            .build(build_type, self.output_observer.clone())
            .await?;
        if !outcome.succeeded {
            error!(exit_code = outcome.exit_code, "build failed");
            return Err(PublishError::BuildFailure {
                exit_code: outcome.exit_code,
            });
        }
        info!("build succeeded");
        Ok(())
    }

    async fn publish(
        &self,
        publication: &Publication,
        tag: &ReleaseTag,
    ) -> Result<Release, PublishError> {
        let new_release = match publication {
            Publication::Issue {
                issue,
                pull_request,
            } => NewRelease {
                tag: tag.clone(),
                name: prerelease_name(tag),
                body: self.issue_body(*issue, pull_request).await?,
                prerelease: true,
                target: self.config.release.target_branch.clone(),
            },
            Publication::Version { pull_request } => NewRelease {
                tag: tag.clone(),
                name: final_release_name(tag),
                body: pull_request.body.clone().unwrap_or_default(),
                prerelease: false,
                target: self.config.release.target_branch.clone(),
            },
        };

        let created = self
            .ports
            .releases
            .create_release(&new_release)
            .await
            .map_err(|source| PublishError::ReleaseCreation {
                tag: tag.clone(),
                source,
            })?;
        info!(release_id = %created.id, name = %new_release.name, "release created");

        let release = self
            .ports
            .releases
            .get_release(created.id)
            .await
            .map_err(|source| PublishError::Remote {
                operation: "get release",
                source,
            })?;
        info!(tag = %release.tag_name, url = %release.html_url, "release published");
        Ok(release)
    }

    async fn issue_body(
        &self,
        issue: IssueNumber,
        pull_request: &PullRequest,
    ) -> Result<String, PublishError> {
        let issue = self
            .ports
            .issues
            .get_issue(issue)
            .await
            .map_err(|source| PublishError::Remote {
                operation: "get issue",
                source,
            })?;
        let commits = self
            .ports
            .pull_requests
            .list_commits(pull_request.number)
            .await
            .map_err(|source| PublishError::Remote {
                operation: "list pull request commits",
                source,
            })?;
        let commits = filter_commits(commits);
        Ok(issue_release_body(&issue, &commits))
    }

    async fn upload(
        &self,
        release: &Release,
        tag: &ReleaseTag,
        build_type: BuildType,
    ) -> Result<Vec<UploadedAsset>, PublishError> {
        let mut uploaded = Vec::new();
        for &kind in build_type.artifacts() {
            let name = self.config.asset_name(tag, kind);
            let path = self.config.artifact_path(tag, kind);
            info!(asset = %name, path = %path.display(), "uploading asset");

            let asset = self
                .ports
                .releases
                .upload_asset(release.id, &path, &name, self.progress_observer.clone())
                .await
                .map_err(|source| PublishError::AssetUpload {
                    asset: name.clone(),
                    source,
                })?;
            if !asset.is_uploaded() {
                warn!(asset = %asset.name, state = %asset.state, "asset not reported as uploaded");
            }
            info!(asset = %asset.name, url = %asset.download_url, "asset uploaded");
            uploaded.push(asset);
        }
        Ok(uploaded)
    }

    async fn notify(
        &self,
        target: IssueNumber,
        tag: &ReleaseTag,
        release: &Release,
    ) -> NotificationOutcome {
        let body = release_comment(tag, &release.html_url);
        match self.ports.issues.create_comment(target, &body).await {
            Ok(()) => {
                info!(%target, "comment posted");
                NotificationOutcome::Posted { target }
            }
            Err(source) => {
                let err = PublishError::Notification {
                    issue: target,
                    source,
                };
                error!(error = %err, "release published but notification failed");
                NotificationOutcome::Failed {
                    target,
                    error: err.to_string(),
                }
            }
        }
    }
}
