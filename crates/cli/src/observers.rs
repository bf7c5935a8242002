//! Log-backed observers for build output and upload progress.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use pipeline::{AssetName, OutputLine, OutputObserver, OutputStream, ProgressObserver, UploadProgress};

/// Logs each build output line. Stderr lines are logged at `info` too since
/// Gradle writes ordinary progress there.
pub fn build_output() -> OutputObserver {
    Arc::new(|line: &OutputLine| match line.stream {
        OutputStream::Stdout => info!(target: "build", "{}", line.text),
        OutputStream::Stderr => info!(target: "build", stream = "stderr", "{}", line.text),
    })
}

/// Logs upload progress in 10% steps.
pub fn upload_progress() -> ProgressObserver {
    let throttle = Mutex::new(ProgressThrottle::default());
    Arc::new(move |progress: &UploadProgress| {
        let step = throttle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .step(progress);
        match step {
            Some(100) => info!(asset = %progress.asset, bytes = progress.total, "upload complete"),
            Some(percent) => info!(asset = %progress.asset, percent, "uploading"),
            None => debug!(asset = %progress.asset, sent = progress.sent, "upload progress"),
        }
    })
}

/// Decides which progress updates are worth a log line.
#[derive(Debug, Default)]
struct ProgressThrottle {
    last: Option<(AssetName, u8)>,
}

impl ProgressThrottle {
    /// Returns the 10% step reached by `progress`, or `None` if that step was
    /// already reported for the same asset.
    fn step(&mut self, progress: &UploadProgress) -> Option<u8> {
        let step = progress.percent() / 10 * 10;
        if let Some((asset, last)) = &self.last {
            if *asset == progress.asset && *last >= step {
                return None;
            }
        }
        self.last = Some((progress.asset.clone(), step));
        Some(step)
    }
}
