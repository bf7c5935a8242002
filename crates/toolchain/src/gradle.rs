//! Gradle wrapper build runner.
//!
//! The child's stdout and stderr are drained concurrently with waiting for
//! exit, one line at a time, so a chatty build never blocks on a full pipe.
//! Lines go to the optional observer; the exit status is the only signal the
//! caller acts on.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::info;

use pipeline::{
    BuildOutcome, BuildTool, BuildType, OutputLine, OutputObserver, OutputStream, PublishError,
    PublisherConfig,
};

/// [`BuildTool`] that runs the configured build command in the checkout.
#[derive(Debug, Clone)]
pub struct GradleRunner {
    command: PathBuf,
    repo_root: PathBuf,
}

impl GradleRunner {
    /// Creates a runner for `config.build.command` in `config.repo_root`.
    pub fn new(config: &PublisherConfig) -> Self {
        Self {
            command: config.build.command.clone(),
            repo_root: config.repo_root.clone(),
        }
    }

    /// The program to spawn. Paths with a directory part (`./gradlew`,
    /// `tools/build.sh`) are taken relative to the checkout; bare names are
    /// looked up on `PATH`.
    fn program(&self) -> PathBuf {
        let has_dir = self
            .command
            .parent()
            .is_some_and(|p| !p.as_os_str().is_empty());
        if has_dir && self.command.is_relative() {
            self.repo_root.join(&self.command)
        } else {
            self.command.clone()
        }
    }
}

async fn forward_lines<R>(reader: Option<R>, stream: OutputStream, observer: Option<OutputObserver>)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                if let Some(observer) = &observer {
                    let text = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\n', '\r'])
                        .to_string();
                    observer(&OutputLine { stream, text });
                }
            }
        }
    }
}

#[async_trait]
impl BuildTool for GradleRunner {
    async fn build(
        &self,
        build_type: BuildType,
        observer: Option<OutputObserver>,
    ) -> Result<BuildOutcome, PublishError> {
        let program = self.program();
        let tasks = build_type.tasks();
        info!(command = %program.display(), tasks = ?tasks, "building binaries");

        let mut child = Command::new(&program)
            .args(tasks)
            .current_dir(&self.repo_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PublishError::io(format!("cannot start {}", display(&program)), e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (status, (), ()) = tokio::join!(
            child.wait(),
            forward_lines(stdout, OutputStream::Stdout, observer.clone()),
            forward_lines(stderr, OutputStream::Stderr, observer),
        );
        let status = status
            .map_err(|e| PublishError::io(format!("cannot wait for {}", display(&program)), e))?;

        let outcome = BuildOutcome::from_exit_code(status.code().unwrap_or(-1));
        info!(exit_code = outcome.exit_code, "build process exited");
        Ok(outcome)
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::{Arc, Mutex};

    fn runner_with_script(script: &str) -> (tempfile::TempDir, GradleRunner) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradlew");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = PublisherConfig {
            repo_root: dir.path().to_path_buf(),
            ..PublisherConfig::default()
        };
        let runner = GradleRunner::new(&config);
        (dir, runner)
    }

    fn collector() -> (Arc<Mutex<Vec<OutputLine>>>, OutputObserver) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let observer: OutputObserver = Arc::new(move |line: &OutputLine| {
            sink.lock().unwrap().push(line.clone());
        });
        (lines, observer)
    }

    #[tokio::test]
    async fn successful_build_streams_both_outputs() {
        let (_dir, runner) = runner_with_script(
            "#!/bin/sh\necho \"tasks: $*\"\necho 'w: deprecated API' >&2\nexit 0\n",
        );
        let (lines, observer) = collector();

        let outcome = runner
            .build(BuildType::Assemble, Some(observer))
            .await
            .unwrap();
        assert!(outcome.succeeded);
        assert_eq!(outcome.exit_code, 0);

        let lines = lines.lock().unwrap();
        assert!(lines.contains(&OutputLine {
            stream: OutputStream::Stdout,
            text: "tasks: clean generateGitProperties assembleRelease".to_string(),
        }));
        assert!(lines.contains(&OutputLine {
            stream: OutputStream::Stderr,
            text: "w: deprecated API".to_string(),
        }));
    }

    #[tokio::test]
    async fn bundle_build_passes_bundle_task() {
        let (_dir, runner) = runner_with_script("#!/bin/sh\necho \"$*\"\n");
        let (lines, observer) = collector();

        runner
            .build(BuildType::AssembleAndBundle, Some(observer))
            .await
            .unwrap();
        let lines = lines.lock().unwrap();
        assert_eq!(
            lines[0].text,
            "clean generateGitProperties bundleRelease assembleRelease"
        );
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported_in_outcome() {
        let (_dir, runner) = runner_with_script("#!/bin/sh\necho 'FAILURE' >&2\nexit 3\n");
        let outcome = runner.build(BuildType::Assemble, None).await.unwrap();
        assert!(!outcome.succeeded);
        assert_eq!(outcome.exit_code, 3);
    }

    #[tokio::test]
    async fn missing_build_command_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = PublisherConfig {
            repo_root: dir.path().to_path_buf(),
            ..PublisherConfig::default()
        };
        let err = GradleRunner::new(&config)
            .build(BuildType::Assemble, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Io { .. }));
    }

    #[test]
    fn program_resolution() {
        let mut config = PublisherConfig {
            repo_root: PathBuf::from("/work/app"),
            ..PublisherConfig::default()
        };
        assert_eq!(
            GradleRunner::new(&config).program(),
            PathBuf::from("/work/app/./gradlew")
        );
        config.build.command = PathBuf::from("gradle");
        assert_eq!(GradleRunner::new(&config).program(), PathBuf::from("gradle"));
        config.build.command = PathBuf::from("/usr/bin/gradle");
        assert_eq!(
            GradleRunner::new(&config).program(),
            PathBuf::from("/usr/bin/gradle")
        );
    }
}
