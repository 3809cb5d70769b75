use rolegate_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{PermissionId, normalize_optional_text};

/// Named capability granted to users directly or through roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    name: NonEmptyString,
    description: Option<String>,
}

impl Permission {
    /// Creates a validated permission.
    pub fn new(
        id: PermissionId,
        name: impl Into<String>,
        description: Option<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::for_field("permission name", name)?,
            description: normalize_optional_text(description),
        })
    }

    /// Returns the stable identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the unique permission name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
