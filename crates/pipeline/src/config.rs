//! Publisher configuration.
//!
//! A single [`PublisherConfig`] value is built by the composition root and
//! handed to every component at construction time; nothing reads global
//! state or the process environment after start-up. Every field has a default
//! matching the Towbook Android project, so an empty TOML document is a valid
//! configuration once a token is supplied.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    ArtifactKind, AssetName, BranchName, ManifestSyntax, PublishError, PullRequestState,
    ReleaseTag, VariableName,
};

/// Bearer credential for the source-hosting API.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wraps a token, returning `None` for an empty or blank value.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Returns the secret for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

// ---------------------------------------------------------------------------

/// Where the project lives on the source-hosting service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubConfig {
    /// Repository owner (user or organisation).
    pub owner: String,
    /// Repository name.
    pub repository: String,
    /// REST API base URL.
    pub api_url: String,
    /// Release-asset upload base URL.
    pub uploads_url: String,
    /// Which pull requests are scanned when looking up the linked one.
    pub pull_request_state: PullRequestState,
    /// API credential; never read from or written to configuration files.
    #[serde(skip)]
    pub token: Option<ApiToken>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: "towbook".to_string(),
            repository: "towbook-android".to_string(),
            api_url: "https://api.github.com".to_string(),
            uploads_url: "https://uploads.github.com".to_string(),
            pull_request_state: PullRequestState::Open,
            token: None,
        }
    }
}

/// Version counter and manifest location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersioningConfig {
    /// Repository variable holding the build counter.
    pub counter_variable: VariableName,
    /// Manifest path relative to the checkout.
    pub manifest_path: PathBuf,
    /// Syntax of the manifest file.
    pub manifest_syntax: ManifestSyntax,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            counter_variable: VariableName::new("VERSION_CODE").expect("non-empty literal"),
            manifest_path: PathBuf::from("app/src/main/AndroidManifest.xml"),
            manifest_syntax: ManifestSyntax::AndroidManifest,
        }
    }
}

/// Commit and push behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VcsConfig {
    /// `git` executable.
    pub git_program: String,
    /// Helper script run to push the bump commit. When unset, `git push` is used.
    /// Relative paths are resolved against the checkout.
    pub push_script: Option<PathBuf>,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            git_program: "git".to_string(),
            push_script: None,
        }
    }
}

/// Build tool invocation and artifact locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Build tool executable, relative to the checkout or absolute.
    pub command: PathBuf,
    /// Asset file-name prefix: `{prefix}-{tag}.{ext}`.
    pub artifact_prefix: String,
    /// Directory holding the release APK, relative to the checkout.
    pub apk_output_dir: PathBuf,
    /// Directory holding the release App Bundle, relative to the checkout.
    pub bundle_output_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("./gradlew"),
            artifact_prefix: "towbook".to_string(),
            apk_output_dir: PathBuf::from("app/build/outputs/apk/release"),
            bundle_output_dir: PathBuf::from("app/build/outputs/bundle/release"),
        }
    }
}

/// Release record settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseConfig {
    /// Branch release tags are created from.
    pub target_branch: BranchName,
    /// Prefix of the release pull request's description; the version follows.
    pub release_marker_prefix: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            target_branch: BranchName::new("release").expect("non-empty literal"),
            release_marker_prefix: "Release ".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------

/// Complete publisher configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublisherConfig {
    /// Repository checkout the run operates on. Set by the caller.
    #[serde(skip)]
    pub repo_root: PathBuf,
    /// Source-hosting settings.
    pub github: GithubConfig,
    /// Counter and manifest settings.
    pub versioning: VersioningConfig,
    /// Commit and push settings.
    pub vcs: VcsConfig,
    /// Build settings.
    pub build: BuildConfig,
    /// Release settings.
    pub release: ReleaseConfig,
}

impl PublisherConfig {
    /// Checks the configuration before any side effect happens.
    pub fn validate(&self) -> Result<(), PublishError> {
        let fail = |message: &str| {
            Err(PublishError::Configuration {
                message: message.to_string(),
            })
        };
        if self.github.owner.trim().is_empty() {
            return fail("github.owner must not be empty");
        }
        if self.github.repository.trim().is_empty() {
            return fail("github.repository must not be empty");
        }
        if self.github.token.is_none() {
            return fail("no API token; set GH_TOKEN");
        }
        if self.versioning.counter_variable.as_str().trim().is_empty() {
            return fail("versioning.counter_variable must not be empty");
        }
        if self.release.target_branch.as_str().trim().is_empty() {
            return fail("release.target_branch must not be empty");
        }
        if self.build.artifact_prefix.trim().is_empty() {
            return fail("build.artifact_prefix must not be empty");
        }
        Ok(())
    }

    /// `"owner/repo"`.
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.github.owner, self.github.repository)
    }

    /// Absolute (or checkout-relative) path of the manifest file.
    pub fn manifest_file(&self) -> PathBuf {
        self.resolve(&self.versioning.manifest_path)
    }

    /// Path of the push helper script, if one is configured.
    pub fn push_script(&self) -> Option<PathBuf> {
        self.vcs.push_script.as_deref().map(|p| self.resolve(p))
    }

    /// Name a build artifact is uploaded under.
    pub fn asset_name(&self, tag: &ReleaseTag, kind: ArtifactKind) -> AssetName {
        AssetName::new(format!(
            "{}-{}.{}",
            self.build.artifact_prefix,
            tag,
            kind.extension()
        ))
        .expect("formatted name is never empty")
    }

    /// Where the build leaves the artifact of `kind` for `tag`.
    pub fn artifact_path(&self, tag: &ReleaseTag, kind: ArtifactKind) -> PathBuf {
        let dir = match kind {
            ArtifactKind::Apk => &self.build.apk_output_dir,
            ArtifactKind::Bundle => &self.build.bundle_output_dir,
        };
        self.resolve(dir)
            .join(self.asset_name(tag, kind).as_str())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.repo_root.join(path)
        }
    }
}
