//! Column to member field mapping

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::errors::{ImportError, ImportResult};

/// Member attribute an import column can feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberField {
    FirstName,
    LastName,
    Email,
    Phone,
    Role,
    CellGroup,
}

impl MemberField {
    pub const ALL: [MemberField; 6] = [
        MemberField::FirstName,
        MemberField::LastName,
        MemberField::Email,
        MemberField::Phone,
        MemberField::Role,
        MemberField::CellGroup,
    ];

    pub const REQUIRED: [MemberField; 2] = [MemberField::FirstName, MemberField::LastName];

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    /// Label shown to administrators
    pub fn label(&self) -> &'static str {
        match self {
            MemberField::FirstName => "name",
            MemberField::LastName => "surname",
            MemberField::Email => "email",
            MemberField::Phone => "phone",
            MemberField::Role => "role",
            MemberField::CellGroup => "group",
        }
    }
}

impl fmt::Display for MemberField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Guess the field a header names. Checks run in priority order, so
/// "Cell Group" is a group and "Last Name" is a surname.
pub fn guess_field(header: &str) -> Option<MemberField> {
    let header = header.trim().to_lowercase();
    if header.is_empty() {
        return None;
    }

    let contains_any = |needles: &[&str]| needles.iter().any(|needle| header.contains(needle));

    if contains_any(&["email", "e-mail"]) {
        Some(MemberField::Email)
    } else if contains_any(&["group"]) {
        Some(MemberField::CellGroup)
    } else if contains_any(&["phone", "mobile", "cell", "tel"]) {
        Some(MemberField::Phone)
    } else if contains_any(&["surname", "last", "family"]) {
        Some(MemberField::LastName)
    } else if contains_any(&["first", "given", "name"]) {
        Some(MemberField::FirstName)
    } else if contains_any(&["role", "position"]) {
        Some(MemberField::Role)
    } else {
        None
    }
}

/// Per-column field assignment. Each field is claimed by at most one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    columns: Vec<Option<MemberField>>,
}

impl ColumnMapping {
    /// Mapping with every column unassigned
    pub fn unmapped(width: usize) -> Self {
        Self { columns: vec![None; width] }
    }

    /// Map headers heuristically; the first header to claim a field keeps it
    pub fn auto_map(headers: &[String]) -> Self {
        let mut claimed = HashSet::new();
        let columns = headers
            .iter()
            .map(|header| guess_field(header).filter(|field| claimed.insert(*field)))
            .collect();

        Self { columns }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Option<MemberField>] {
        &self.columns
    }

    pub fn field_for(&self, column: usize) -> Option<MemberField> {
        self.columns.get(column).copied().flatten()
    }

    pub fn column_for(&self, field: MemberField) -> Option<usize> {
        self.columns.iter().position(|slot| *slot == Some(field))
    }

    /// Assign `field` to `column`, moving it off any column that held it
    pub fn assign(&mut self, column: usize, field: MemberField) -> ImportResult<()> {
        self.check_column(column)?;

        for slot in self.columns.iter_mut() {
            if *slot == Some(field) {
                *slot = None;
            }
        }
        self.columns[column] = Some(field);
        Ok(())
    }

    pub fn clear(&mut self, column: usize) -> ImportResult<()> {
        self.check_column(column)?;
        self.columns[column] = None;
        Ok(())
    }

    /// Required fields no column feeds
    pub fn missing_required(&self) -> Vec<MemberField> {
        MemberField::REQUIRED
            .iter()
            .copied()
            .filter(|field| self.column_for(*field).is_none())
            .collect()
    }

    /// Reject a mapping that cannot drive an import of a table `width` columns wide
    pub fn ensure_usable(&self, width: usize) -> ImportResult<()> {
        if self.columns.len() != width {
            return Err(ImportError::ColumnOutOfRange {
                column: self.columns.len(),
                width,
            });
        }

        match self.missing_required().first() {
            Some(field) => Err(ImportError::RequiredFieldUnmapped(*field)),
            None => Ok(()),
        }
    }

    /// Drop repeated claims from a client-supplied mapping, first column wins
    pub fn deduplicated(mut self) -> Self {
        let mut claimed = HashSet::new();
        for slot in self.columns.iter_mut() {
            if let Some(field) = *slot {
                if !claimed.insert(field) {
                    *slot = None;
                }
            }
        }
        self
    }

    fn check_column(&self, column: usize) -> ImportResult<()> {
        if column >= self.columns.len() {
            return Err(ImportError::ColumnOutOfRange {
                column,
                width: self.columns.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_guess_priorities() {
        assert_eq!(guess_field("E-mail Address"), Some(MemberField::Email));
        assert_eq!(guess_field("Cell Group"), Some(MemberField::CellGroup));
        assert_eq!(guess_field("Cell Number"), Some(MemberField::Phone));
        assert_eq!(guess_field("Mobile"), Some(MemberField::Phone));
        assert_eq!(guess_field("Last Name"), Some(MemberField::LastName));
        assert_eq!(guess_field("Family"), Some(MemberField::LastName));
        assert_eq!(guess_field("Given Name"), Some(MemberField::FirstName));
        assert_eq!(guess_field("Name"), Some(MemberField::FirstName));
        assert_eq!(guess_field("Position"), Some(MemberField::Role));
        assert_eq!(guess_field("Notes"), None);
        assert_eq!(guess_field("   "), None);
    }

    #[test]
    fn test_auto_map_export_headers() {
        let mapping = ColumnMapping::auto_map(&headers(&["Name", "Surname", "Email", "Phone", "Group", "Role"]));

        assert_eq!(
            mapping.columns(),
            &[
                Some(MemberField::FirstName),
                Some(MemberField::LastName),
                Some(MemberField::Email),
                Some(MemberField::Phone),
                Some(MemberField::CellGroup),
                Some(MemberField::Role),
            ]
        );
        assert!(mapping.missing_required().is_empty());
    }

    #[test]
    fn test_first_header_wins() {
        let mapping = ColumnMapping::auto_map(&headers(&["Email", "Work Email", "First Name", "Name"]));

        assert_eq!(mapping.field_for(0), Some(MemberField::Email));
        assert_eq!(mapping.field_for(1), None);
        assert_eq!(mapping.field_for(2), Some(MemberField::FirstName));
        assert_eq!(mapping.field_for(3), None);
        assert_eq!(mapping.missing_required(), vec![MemberField::LastName]);
    }

    #[test]
    fn test_assign_moves_field() {
        let mut mapping = ColumnMapping::auto_map(&headers(&["First", "Other"]));
        mapping.assign(1, MemberField::FirstName).unwrap();

        assert_eq!(mapping.field_for(0), None);
        assert_eq!(mapping.column_for(MemberField::FirstName), Some(1));

        mapping.clear(1).unwrap();
        assert_eq!(mapping.missing_required(), MemberField::REQUIRED.to_vec());
        assert_matches!(mapping.assign(5, MemberField::Role), Err(ImportError::ColumnOutOfRange { column: 5, width: 2 }));
    }

    #[test]
    fn test_ensure_usable() {
        let mapping = ColumnMapping::auto_map(&headers(&["Name", "Email"]));
        assert_matches!(mapping.ensure_usable(2), Err(ImportError::RequiredFieldUnmapped(MemberField::LastName)));
        assert_matches!(mapping.ensure_usable(3), Err(ImportError::ColumnOutOfRange { .. }));

        let complete = ColumnMapping::auto_map(&headers(&["Name", "Surname"]));
        assert!(complete.ensure_usable(2).is_ok());
    }

    #[test]
    fn test_deduplicated_client_mapping() {
        let mapping: ColumnMapping = serde_json::from_str(
            r#"{"columns": ["first_name", "first_name", "last_name", null]}"#
        ).unwrap();

        let mapping = mapping.deduplicated();
        assert_eq!(mapping.field_for(0), Some(MemberField::FirstName));
        assert_eq!(mapping.field_for(1), None);
        assert_eq!(mapping.field_for(2), Some(MemberField::LastName));
    }
}
