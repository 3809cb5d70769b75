use chrono::{DateTime, Utc};
use rolegate_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{DocumentId, UserId, normalize_optional_text};

/// Stored document record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    title: NonEmptyString,
    description: Option<String>,
    content: NonEmptyString,
    uploaded_by: Option<UserId>,
    sensitive_data: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Document {
    /// Creates a validated document.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: DocumentId,
        title: impl Into<String>,
        description: Option<String>,
        content: impl Into<String>,
        uploaded_by: Option<UserId>,
        sensitive_data: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            title: NonEmptyString::for_field("title", title)?,
            description: normalize_optional_text(description),
            content: NonEmptyString::for_field("content", content)?,
            uploaded_by,
            sensitive_data: normalize_optional_text(sensitive_data),
            created_at,
            updated_at,
        })
    }

    /// Returns the stable identifier.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &NonEmptyString {
        &self.title
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the document body.
    #[must_use]
    pub fn content(&self) -> &NonEmptyString {
        &self.content
    }

    /// Returns the uploading user, if still present.
    #[must_use]
    pub fn uploaded_by(&self) -> Option<UserId> {
        self.uploaded_by
    }

    /// Returns the optional sensitive payload.
    #[must_use]
    pub fn sensitive_data(&self) -> Option<&str> {
        self.sensitive_data.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
