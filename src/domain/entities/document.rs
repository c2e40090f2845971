use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TenantId;
use crate::domain::errors::{DomainError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// PENDING -> PROCESSING -> COMPLETED | FAILED. Nothing leaves a terminal state.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }
}

/// One step of the processing lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    BeginProcessing,
    Complete { text: String, output_path: String },
    Fail,
}

/// User-editable fields. Status and blob paths are owned by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentUpdate {
    pub name: String,
    /// Replaces the extracted text when present.
    pub extracted_text: Option<String>,
    /// Files the document under this folder; `None` removes it from its folder.
    pub folder_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub name: String,
    pub source_path: String,
    pub output_path: Option<String>,
    pub extracted_text: Option<String>,
    pub status: DocumentStatus,
    pub folder_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        source_path: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.into(),
            source_path: source_path.into(),
            output_path: None,
            extracted_text: None,
            status: DocumentStatus::Pending,
            folder_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_folder(mut self, folder_id: Option<Uuid>) -> Self {
        self.folder_id = folder_id;
        self
    }

    pub fn is_downloadable(&self) -> bool {
        self.status == DocumentStatus::Completed && self.output_path.is_some()
    }

    pub fn begin_processing(&mut self) -> Result<()> {
        self.transition(DocumentStatus::Processing)
    }

    pub fn complete(&mut self, text: String, output_path: String) -> Result<()> {
        self.transition(DocumentStatus::Completed)?;
        self.extracted_text = Some(text);
        self.output_path = Some(output_path);
        Ok(())
    }

    /// Marks the attempt failed, discarding anything it produced.
    pub fn fail(&mut self) -> Result<()> {
        self.transition(DocumentStatus::Failed)?;
        self.extracted_text = None;
        self.output_path = None;
        Ok(())
    }

    pub fn apply(&mut self, change: StatusChange) -> Result<()> {
        match change {
            StatusChange::BeginProcessing => self.begin_processing(),
            StatusChange::Complete { text, output_path } => self.complete(text, output_path),
            StatusChange::Fail => self.fail(),
        }
    }

    pub fn apply_update(&mut self, update: DocumentUpdate) {
        self.name = update.name;
        if let Some(text) = update.extracted_text {
            self.extracted_text = Some(text);
        }
        self.folder_id = update.folder_id;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn transition(&mut self, next: DocumentStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::invalid_state(format!(
                "document {} cannot move from {} to {}",
                self.id,
                self.status.as_str(),
                next.as_str()
            )));
        }
        self.status = next;
        self.touch();
        Ok(())
    }
}
