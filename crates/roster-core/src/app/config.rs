//! ReconcilerConfig - どのフィールド名を解釈するか
//!
//! 変更検知層はフィールド名をキーに差分を渡してくる。
//! 旧データでは期限フィールドが `doneBefore` のこともあるため設定可能にしている。

use serde::{Deserialize, Serialize};

use crate::app::builder::BuildError;
use crate::domain::{ASSIGNMENT_FIELD, DEADLINE_FIELD};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcilerConfig {
    pub assignment_field: String,
    pub deadline_field: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            assignment_field: ASSIGNMENT_FIELD.to_string(),
            deadline_field: DEADLINE_FIELD.to_string(),
        }
    }
}

impl ReconcilerConfig {
    pub fn from_json_str(s: &str) -> Result<Self, BuildError> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| BuildError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_deadline_field(mut self, name: impl Into<String>) -> Self {
        self.deadline_field = name.into();
        self
    }

    pub fn with_assignment_field(mut self, name: impl Into<String>) -> Self {
        self.assignment_field = name.into();
        self
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        if self.assignment_field.trim().is_empty() {
            return Err(BuildError::InvalidConfig(
                "assignment_field must not be empty".to_string(),
            ));
        }
        if self.deadline_field.trim().is_empty() {
            return Err(BuildError::InvalidConfig(
                "deadline_field must not be empty".to_string(),
            ));
        }
        if self.assignment_field == self.deadline_field {
            return Err(BuildError::InvalidConfig(format!(
                "assignment_field and deadline_field are both `{}`",
                self.assignment_field
            )));
        }
        Ok(())
    }
}
