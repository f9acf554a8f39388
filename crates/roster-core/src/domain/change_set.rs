//! Field-level change set handed over by the change-detection layer.
//!
//! Each entry maps a field name to `[old, new]`. Only the assignment and the
//! deadline fields are interpreted; every other key passes through untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use super::errors::ReconcileError;
use super::ids::UserId;

/// Default name of the assignment field.
pub const ASSIGNMENT_FIELD: &str = "assignedTo";

/// Default name of the deadline field.
pub const DEADLINE_FIELD: &str = "dueBefore";

/// One side of a field change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    User(UserId),
    Instant(DateTime<FixedOffset>),
    Other(serde_json::Value),
}

impl FieldValue {
    /// Classifies a raw JSON value. Strings are tried as a user id first,
    /// then as an RFC 3339 instant.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::String(s) => {
                if let Ok(user) = s.parse::<UserId>() {
                    FieldValue::User(user)
                } else if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
                    FieldValue::Instant(instant)
                } else {
                    FieldValue::Other(value.clone())
                }
            }
            other => FieldValue::Other(other.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    fn as_instant(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            FieldValue::Instant(instant) => Some(*instant),
            _ => None,
        }
    }
}

impl From<Option<UserId>> for FieldValue {
    fn from(user: Option<UserId>) -> Self {
        user.map_or(FieldValue::Null, FieldValue::User)
    }
}

impl From<Option<DateTime<FixedOffset>>> for FieldValue {
    fn from(instant: Option<DateTime<FixedOffset>>) -> Self {
        instant.map_or(FieldValue::Null, FieldValue::Instant)
    }
}

/// `(old, new)` pair of the assignment field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentChange {
    pub old: Option<UserId>,
    pub new: Option<UserId>,
}

/// A deadline move that crossed a calendar-day boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateChange {
    pub old_date: NaiveDate,
    pub new_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    entries: BTreeMap<String, Vec<FieldValue>>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw entry. Well-formed entries hold exactly `[old, new]`.
    pub fn field(mut self, name: impl Into<String>, values: Vec<FieldValue>) -> Self {
        self.entries.insert(name.into(), values);
        self
    }

    pub fn change(self, name: impl Into<String>, old: FieldValue, new: FieldValue) -> Self {
        self.field(name, vec![old, new])
    }

    /// `assignedTo` entry.
    pub fn assigned_to(self, old: Option<UserId>, new: Option<UserId>) -> Self {
        self.change(ASSIGNMENT_FIELD, old.into(), new.into())
    }

    /// `dueBefore` entry.
    pub fn due_before(
        self,
        old: Option<DateTime<FixedOffset>>,
        new: Option<DateTime<FixedOffset>>,
    ) -> Self {
        self.change(DEADLINE_FIELD, old.into(), new.into())
    }

    /// Parses `{"field": [old, new], ...}`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ReconcileError> {
        let object = value.as_object().ok_or_else(|| {
            ReconcileError::InvalidChangeSet("expected an object of field changes".to_string())
        })?;

        let mut entries = BTreeMap::new();
        for (name, change) in object {
            let values = change
                .as_array()
                .ok_or_else(|| ReconcileError::malformed(name, "expected an [old, new] array"))?;
            entries.insert(name.clone(), values.iter().map(FieldValue::from_json).collect());
        }
        Ok(Self { entries })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&[FieldValue]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(old, new)` of `name`, or `None` when the field did not change.
    pub fn pair(&self, name: &str) -> Result<Option<(&FieldValue, &FieldValue)>, ReconcileError> {
        match self.entries.get(name).map(Vec::as_slice) {
            None => Ok(None),
            Some([old, new]) => Ok(Some((old, new))),
            Some(values) => Err(ReconcileError::malformed(
                name,
                format!("expected 2 values, got {}", values.len()),
            )),
        }
    }

    /// Interprets the assignment field. Both sides must be null or a user.
    pub fn assignment_change(&self, name: &str) -> Result<Option<AssignmentChange>, ReconcileError> {
        let Some((old, new)) = self.pair(name)? else {
            return Ok(None);
        };
        Ok(Some(AssignmentChange {
            old: expect_user(name, old)?,
            new: expect_user(name, new)?,
        }))
    }

    /// Interprets the deadline field.
    ///
    /// Only a move across a calendar day counts; a same-day time edit, or a
    /// side that is not an instant (e.g. the deadline was cleared), yields none.
    pub fn date_change(&self, name: &str) -> Result<Option<DateChange>, ReconcileError> {
        let Some((old, new)) = self.pair(name)? else {
            return Ok(None);
        };
        let (Some(old), Some(new)) = (old.as_instant(), new.as_instant()) else {
            return Ok(None);
        };

        let old_date = old.date_naive();
        let new_date = new.date_naive();
        if old_date == new_date {
            return Ok(None);
        }
        Ok(Some(DateChange { old_date, new_date }))
    }
}

fn expect_user(field: &str, value: &FieldValue) -> Result<Option<UserId>, ReconcileError> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::User(user) => Ok(Some(*user)),
        other => Err(ReconcileError::malformed(
            field,
            format!("expected a user or null, got {other:?}"),
        )),
    }
}
