use std::process::Stdio;

use futures::future::BoxFuture;
use tokio::process::Command;
use tracing::debug;

use super::{CaptureError, EmotionSource, Modality};

/// Runs an external classifier and takes the first non-empty stdout line as the label.
///
/// The child is killed when the capture future is dropped, so an abandoned
/// capture (timeout, shutdown) does not leave the process behind.
#[derive(Debug, Clone)]
pub struct CommandSource {
    modality: Modality,
    program: String,
    args: Vec<String>,
}

impl CommandSource {
    /// Splits `command_line` on whitespace. Returns `None` for a blank command.
    pub fn parse(modality: Modality, command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            modality,
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self) -> Result<String, CaptureError> {
        debug!(modality = self.modality.as_str(), program = %self.program, "running classifier");
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::Failed(format!(
                "{} ({})",
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or(CaptureError::Empty)
    }
}

impl EmotionSource for CommandSource {
    fn modality(&self) -> Modality {
        self.modality
    }

    fn capture(&self) -> BoxFuture<'_, Result<String, CaptureError>> {
        Box::pin(self.run())
    }
}
