//! Column mapping properties

use std::collections::HashSet;

use proptest::prelude::*;

use ChurchHub::import::{guess_field, ColumnMapping, MemberField};

fn header_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Name".to_string()),
        Just("First Name".to_string()),
        Just("Surname".to_string()),
        Just("Last Name".to_string()),
        Just("E-mail".to_string()),
        Just("Mobile".to_string()),
        Just("Cell Group".to_string()),
        Just("Role".to_string()),
        "[A-Za-z ]{0,12}",
    ]
}

fn field_strategy() -> impl Strategy<Value = MemberField> {
    proptest::sample::select(MemberField::ALL.to_vec())
}

proptest! {
    #[test]
    fn auto_map_claims_each_field_at_most_once(headers in prop::collection::vec(header_strategy(), 0..12)) {
        let mapping = ColumnMapping::auto_map(&headers);
        prop_assert_eq!(mapping.width(), headers.len());

        let mut seen = HashSet::new();
        for field in mapping.columns().iter().flatten() {
            prop_assert!(seen.insert(*field), "field {:?} mapped twice", field);
        }
    }

    #[test]
    fn auto_mapped_fields_match_their_header(headers in prop::collection::vec(header_strategy(), 1..12)) {
        let mapping = ColumnMapping::auto_map(&headers);
        for (column, header) in headers.iter().enumerate() {
            if let Some(field) = mapping.field_for(column) {
                prop_assert_eq!(guess_field(header), Some(field));
            }
        }
    }

    #[test]
    fn assign_moves_the_field(
        width in 1usize..8,
        assignments in prop::collection::vec((0usize..8, field_strategy()), 0..20),
    ) {
        let mut mapping = ColumnMapping::unmapped(width);
        for (column, field) in assignments {
            let result = mapping.assign(column, field);
            if column < width {
                prop_assert!(result.is_ok());
                prop_assert_eq!(mapping.column_for(field), Some(column));
            } else {
                prop_assert!(result.is_err());
            }
        }

        let assigned: Vec<_> = mapping.columns().iter().flatten().collect();
        let unique: HashSet<_> = assigned.iter().collect();
        prop_assert_eq!(assigned.len(), unique.len());
    }
}

#[test]
fn test_client_mapping_is_deduplicated() {
    let json = r#"{"columns":["first_name","last_name","first_name",null,"email"]}"#;
    let mapping: ColumnMapping = serde_json::from_str(json).unwrap();

    let mapping = mapping.deduplicated();

    assert_eq!(mapping.field_for(0), Some(MemberField::FirstName));
    assert_eq!(mapping.field_for(2), None);
    assert_eq!(mapping.column_for(MemberField::Email), Some(4));
    assert!(mapping.ensure_usable(5).is_ok());
}

#[test]
fn test_mapping_width_must_match_table() {
    let mapping = ColumnMapping::auto_map(&["Name".to_string(), "Surname".to_string()]);
    assert!(mapping.ensure_usable(2).is_ok());
    assert!(mapping.ensure_usable(3).is_err());
}
