//! Configuration loading.
//!
//! Defaults come from [`PublisherConfig::default`]. A TOML file may override
//! any of them; the API token only ever comes from the environment.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::debug;

use pipeline::{ApiToken, PublisherConfig};

/// Config file looked up inside the checkout when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".publisher/config.toml";

/// Environment variable holding the GitHub token.
pub const TOKEN_ENV: &str = "GH_TOKEN";

/// Builds and validates the configuration for a run against `repo`.
///
/// `explicit` must exist when given. The default file is optional.
pub fn load(repo: &Path, explicit: Option<&Path>, token: Option<String>) -> Result<PublisherConfig> {
    let repo_root = repo
        .canonicalize()
        .with_context(|| format!("repository checkout {} not found", repo.display()))?;

    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => (repo_root.join(DEFAULT_CONFIG_FILE), false),
    };

    let mut config = read_file(&path, required)?;
    config.repo_root = repo_root;
    config.github.token = token.and_then(ApiToken::new);
    config.validate()?;
    Ok(config)
}

fn read_file(path: &Path, required: bool) -> Result<PublisherConfig> {
    if !path.exists() {
        if required {
            bail!("config file {} does not exist", path.display());
        }
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(PublisherConfig::default());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    let config = toml::from_str(&text)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::{ManifestSyntax, PullRequestState};

    fn write_config(repo: &Path, text: &str) {
        let dir = repo.join(".publisher");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), text).unwrap();
    }

    fn token() -> Option<String> {
        Some("ghp_test".to_string())
    }

    #[test]
    fn defaults_without_config_file() {
        let repo = tempfile::tempdir().unwrap();
        let config = load(repo.path(), None, token()).unwrap();

        assert_eq!(config.repo_slug(), "towbook/towbook-android");
        assert_eq!(config.versioning.counter_variable.as_str(), "VERSION_CODE");
        assert_eq!(config.release.target_branch.as_str(), "release");
        assert_eq!(config.github.pull_request_state, PullRequestState::Open);
        assert_eq!(config.repo_root, repo.path().canonicalize().unwrap());
        assert_eq!(config.github.token.as_ref().map(|t| t.expose()), Some("ghp_test"));
    }

    #[test]
    fn config_file_overrides_selected_fields() {
        let repo = tempfile::tempdir().unwrap();
        write_config(
            repo.path(),
            r#"
[github]
owner = "acme"
repository = "tow-app"
pull_request_state = "all"

[versioning]
manifest_path = "app/build.gradle"
manifest_syntax = "gradle-script"

[vcs]
push_script = "gpush.sh"
"#,
        );

        let config = load(repo.path(), None, token()).unwrap();
        assert_eq!(config.repo_slug(), "acme/tow-app");
        assert_eq!(config.github.pull_request_state, PullRequestState::All);
        assert_eq!(config.versioning.manifest_syntax, ManifestSyntax::GradleScript);
        assert_eq!(
            config.push_script(),
            Some(repo.path().canonicalize().unwrap().join("gpush.sh"))
        );
        // Untouched sections keep their defaults.
        assert_eq!(config.build.artifact_prefix, "towbook");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let repo = tempfile::tempdir().unwrap();
        write_config(repo.path(), "[github]\nowner = \"acme\"\nrepo = \"typo\"\n");

        let err = load(repo.path(), None, token()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid config file"));
    }

    #[test]
    fn token_in_config_file_is_not_accepted() {
        let repo = tempfile::tempdir().unwrap();
        write_config(repo.path(), "[github]\ntoken = \"ghp_in_file\"\n");
        assert!(load(repo.path(), None, token()).is_err());
    }

    #[test]
    fn explicit_config_must_exist() {
        let repo = tempfile::tempdir().unwrap();
        let missing = repo.path().join("nope.toml");
        let err = load(repo.path(), Some(&missing), token()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn missing_token_fails_validation() {
        let repo = tempfile::tempdir().unwrap();
        let err = load(repo.path(), None, None).unwrap_err();
        assert!(err.to_string().contains("GH_TOKEN"));
    }

    #[test]
    fn empty_token_counts_as_missing() {
        let repo = tempfile::tempdir().unwrap();
        assert!(load(repo.path(), None, Some(String::new())).is_err());
    }

    #[test]
    fn missing_checkout_is_an_error() {
        let repo = tempfile::tempdir().unwrap();
        let err = load(&repo.path().join("absent"), None, token()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
