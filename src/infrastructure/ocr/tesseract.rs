use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{info, instrument};

use crate::domain::{ports::OcrEngine, DomainError};
use crate::infrastructure::config::OcrConfig;

/// Runs the `tesseract` command line tool, feeding the image through stdin and
/// reading the recognized text from stdout.
pub struct TesseractOcr {
    command: String,
    language: String,
    tessdata_path: Option<String>,
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self {
            command: "tesseract".to_string(),
            language: "eng".to_string(),
            tessdata_path: None,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            command: config.command.clone(),
            language: config.language.clone(),
            tessdata_path: config.tessdata_path.clone(),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
        ];
        if let Some(path) = &self.tessdata_path {
            args.push("--tessdata-dir".to_string());
            args.push(path.clone());
        }
        args
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    #[instrument(skip(self, image), fields(bytes = image.len(), language = %self.language))]
    async fn extract_text(&self, image: &[u8]) -> Result<String, DomainError> {
        info!("performing OCR");

        let mut child = Command::new(&self.command)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::ocr(format!("could not start {}: {e}", self.command)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DomainError::ocr("OCR process stdin unavailable"))?;
        let input = image.to_vec();
        let feed = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| DomainError::ocr(format!("OCR process failed: {e}")))?;

        match feed.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if output.status.success() => {
                return Err(DomainError::ocr(format!("could not send image to OCR: {e}")));
            }
            Ok(Err(_)) => {}
            Err(e) => return Err(DomainError::internal(e.to_string())),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::ocr(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| DomainError::ocr(format!("OCR output is not valid UTF-8: {e}")))
    }
}
