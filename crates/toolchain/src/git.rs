//! Commit and push through the system `git` and an optional push helper.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use pipeline::{PublishError, PublisherConfig, VersionControl};

/// [`VersionControl`] over the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCommitter {
    program: String,
    repo_root: PathBuf,
    push_script: Option<PathBuf>,
}

impl GitCommitter {
    /// Creates a committer for the checkout in `config.repo_root`.
    pub fn new(config: &PublisherConfig) -> Self {
        Self {
            program: config.vcs.git_program.clone(),
            repo_root: config.repo_root.clone(),
            push_script: config.push_script(),
        }
    }

    async fn run<I, S>(&self, program: &OsStr, args: I) -> Result<String, PublishError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
        let command_line = std::iter::once(program)
            .chain(args.iter().map(|a| a.as_os_str()))
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(command = %command_line, "running");

        let output = Command::new(program)
            .args(&args)
            .current_dir(&self.repo_root)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| PublishError::VcsCommand {
                command: command_line.clone(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.is_empty() {
                // git reports "nothing to commit" on stdout.
                stderr = String::from_utf8_lossy(&output.stdout).trim().to_string();
            }
            return Err(PublishError::VcsCommand {
                command: command_line,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl VersionControl for GitCommitter {
    async fn commit(&self, path: &Path, message: &str) -> Result<(), PublishError> {
        let output = self
            .run(
                OsStr::new(&self.program),
                [OsStr::new("commit"), path.as_os_str(), OsStr::new("-m"), OsStr::new(message)],
            )
            .await?;
        info!(%message, "committed manifest");
        debug!(output = %output);
        Ok(())
    }

    async fn push(&self) -> Result<(), PublishError> {
        let output = match &self.push_script {
            Some(script) => {
                make_executable(script).map_err(|e| PublishError::VcsCommand {
                    command: script.display().to_string(),
                    stderr: format!("cannot make executable: {e}"),
                })?;
                self.run(script.as_os_str(), std::iter::empty::<&OsStr>())
                    .await?
            }
            None => self.run(OsStr::new(&self.program), ["push"]).await?,
        };
        info!("pushed version bump");
        debug!(output = %output);
        Ok(())
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn make_executable(path: &Path) -> std::io::Result<()> {
    std::fs::metadata(path).map(|_| ())
}
