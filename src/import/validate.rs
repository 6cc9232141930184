//! Per-row extraction and validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::import::mapping::{ColumnMapping, MemberField};

/// Values pulled from one row; empty cells are absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub cell_group: Option<String>,
}

impl MemberDraft {
    /// Read mapped cells out of a row
    pub fn from_row(row: &[String], mapping: &ColumnMapping) -> Self {
        let mut draft = MemberDraft::default();

        for (column, field) in mapping.columns().iter().enumerate() {
            let Some(field) = field else { continue };
            let value = row
                .get(column)
                .map(|cell| cell.trim())
                .filter(|cell| !cell.is_empty())
                .map(str::to_string);

            match field {
                MemberField::FirstName => draft.first_name = value,
                MemberField::LastName => draft.last_name = value,
                MemberField::Email => draft.email = value,
                MemberField::Phone => draft.phone = value,
                MemberField::Role => draft.role = value,
                MemberField::CellGroup => draft.cell_group = value,
            }
        }

        draft
    }
}

/// Row that passed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidMember {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub cell_group: Option<String>,
}

/// Reason a row was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("Missing required field: {0}")]
    MissingField(MemberField),

    #[error("Failed to save member: {0}")]
    WriteFailed(String),
}

/// Require first name and surname
pub fn validate(draft: MemberDraft) -> Result<ValidMember, RowError> {
    let first_name = draft.first_name.ok_or(RowError::MissingField(MemberField::FirstName))?;
    let last_name = draft.last_name.ok_or(RowError::MissingField(MemberField::LastName))?;

    Ok(ValidMember {
        first_name,
        last_name,
        email: draft.email,
        phone: draft.phone,
        role: draft.role,
        cell_group: draft.cell_group,
    })
}

pub fn validate_row(row: &[String], mapping: &ColumnMapping) -> Result<ValidMember, RowError> {
    validate(MemberDraft::from_row(row, mapping))
}
