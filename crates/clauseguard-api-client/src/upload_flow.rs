//! Client-side upload sequence: pick a file, detect its type, confirm, analyze.
//!
//! ```text
//! Upload --detect--> Detecting --ok--> Confirm --confirm--> Processing --ok--> Done
//!   ^                    |                |                      |
//!   +------ failure -----+---- decline ---+------- failure ------+
//! ```
//!
//! While `Processing`, a ticker advances a cosmetic progress value by 5 every
//! 500 ms up to 95. It knows nothing about the server; the value jumps to 100
//! when the analysis arrives.

use crate::api::ContractFile;
use crate::ApiClient;
use async_trait::async_trait;
use clauseguard_core::models::ContractAnalysis;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const PROGRESS_TICK: Duration = Duration::from_millis(500);
pub const PROGRESS_STEP: u8 = 5;
pub const PROGRESS_CAP: u8 = 95;

pub const DETECT_FAILED_MESSAGE: &str = "Failed to detect contract type";
pub const ANALYZE_FAILED_MESSAGE: &str = "Failed to upload contract";
pub const NO_FILE_MESSAGE: &str = "No file selected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStep {
    Upload,
    Detecting,
    Confirm,
    Processing,
    Done,
}

impl fmt::Display for UploadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UploadStep::Upload => "upload",
            UploadStep::Detecting => "detecting",
            UploadStep::Confirm => "confirm",
            UploadStep::Processing => "processing",
            UploadStep::Done => "done",
        };
        f.write_str(s)
    }
}

/// An action that is not valid in the current step.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("Cannot {action} while in step '{step}'")]
    InvalidTransition { step: UploadStep, action: &'static str },

    #[error("No file selected")]
    NoFile,
}

/// The two server calls the flow makes.
#[async_trait]
pub trait ContractBackend: Send + Sync {
    async fn detect_type(&self, file: &ContractFile) -> anyhow::Result<String>;

    async fn analyze(
        &self,
        file: &ContractFile,
        contract_type: &str,
    ) -> anyhow::Result<ContractAnalysis>;
}

#[async_trait]
impl ContractBackend for ApiClient {
    async fn detect_type(&self, file: &ContractFile) -> anyhow::Result<String> {
        self.detect_contract_type(file).await
    }

    async fn analyze(
        &self,
        file: &ContractFile,
        contract_type: &str,
    ) -> anyhow::Result<ContractAnalysis> {
        self.analyze_contract(file, contract_type).await
    }
}

/// Advance `progress` by [`PROGRESS_STEP`] every [`PROGRESS_TICK`], stopping at [`PROGRESS_CAP`].
pub fn spawn_progress_ticker(progress: Arc<watch::Sender<u8>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PROGRESS_TICK);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let mut capped = false;
            progress.send_modify(|p| {
                *p = p.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP);
                capped = *p >= PROGRESS_CAP;
            });
            if capped {
                break;
            }
        }
    })
}

pub struct UploadFlow<B> {
    backend: B,
    step: UploadStep,
    file: Option<ContractFile>,
    detected_type: Option<String>,
    analysis: Option<ContractAnalysis>,
    error: Option<String>,
    progress: Arc<watch::Sender<u8>>,
}

impl<B: ContractBackend> UploadFlow<B> {
    pub fn new(backend: B) -> Self {
        let (progress, _) = watch::channel(0);
        Self {
            backend,
            step: UploadStep::Upload,
            file: None,
            detected_type: None,
            analysis: None,
            error: None,
            progress: Arc::new(progress),
        }
    }

    pub fn step(&self) -> UploadStep {
        self.step
    }

    pub fn file(&self) -> Option<&ContractFile> {
        self.file.as_ref()
    }

    pub fn detected_type(&self) -> Option<&str> {
        self.detected_type.as_deref()
    }

    pub fn analysis(&self) -> Option<&ContractAnalysis> {
        self.analysis.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn progress(&self) -> u8 {
        *self.progress.borrow()
    }

    /// Receiver that observes every progress change.
    pub fn subscribe_progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    /// Pick a file (or fail to). Always lands back in `Upload`.
    pub fn select_file(&mut self, file: Option<ContractFile>) {
        match file {
            Some(file) => {
                self.file = Some(file);
                self.detected_type = None;
                self.analysis = None;
                self.error = None;
                self.step = UploadStep::Upload;
            }
            None => self.error = Some(NO_FILE_MESSAGE.to_string()),
        }
    }

    fn expect_step(&self, expected: UploadStep, action: &'static str) -> Result<(), FlowError> {
        if self.step != expected {
            return Err(FlowError::InvalidTransition {
                step: self.step,
                action,
            });
        }
        Ok(())
    }

    /// Send the selected file for type detection. Ends in `Confirm` or, on failure, `Upload`.
    pub async fn detect(&mut self) -> Result<UploadStep, FlowError> {
        self.expect_step(UploadStep::Upload, "detect")?;
        let file = self.file.as_ref().ok_or(FlowError::NoFile)?;

        self.step = UploadStep::Detecting;
        self.error = None;

        match self.backend.detect_type(file).await {
            Ok(contract_type) => {
                tracing::debug!(contract_type = %contract_type, "Contract type detected");
                self.detected_type = Some(contract_type);
                self.step = UploadStep::Confirm;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Contract type detection failed");
                self.error = Some(DETECT_FAILED_MESSAGE.to_string());
                self.step = UploadStep::Upload;
            }
        }
        Ok(self.step)
    }

    /// Reject the detected type and go back to file selection.
    pub fn decline(&mut self) -> Result<(), FlowError> {
        self.expect_step(UploadStep::Confirm, "decline")?;
        self.detected_type = None;
        self.step = UploadStep::Upload;
        Ok(())
    }

    /// Accept the detected type and run the analysis. Ends in `Done` or, on failure, `Upload`.
    pub async fn confirm(&mut self) -> Result<UploadStep, FlowError> {
        self.expect_step(UploadStep::Confirm, "confirm")?;
        let file = self.file.as_ref().ok_or(FlowError::NoFile)?;
        let contract_type = self.detected_type.clone().unwrap_or_default();

        self.step = UploadStep::Processing;
        self.progress.send_replace(0);
        let ticker = spawn_progress_ticker(self.progress.clone());

        let result = self.backend.analyze(file, &contract_type).await;
        ticker.abort();

        match result {
            Ok(analysis) => {
                self.analysis = Some(analysis);
                self.progress.send_replace(100);
                self.step = UploadStep::Done;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Contract analysis failed");
                self.error = Some(ANALYZE_FAILED_MESSAGE.to_string());
                self.step = UploadStep::Upload;
            }
        }
        Ok(self.step)
    }

    /// Forget everything and start over.
    pub fn reset(&mut self) {
        self.step = UploadStep::Upload;
        self.file = None;
        self.detected_type = None;
        self.analysis = None;
        self.error = None;
        self.progress.send_replace(0);
    }
}
