//! CSV and XLSX downloads
//!
//! The members export uses the same header row the importer auto-maps, so
//! an exported file can be edited and uploaded again unchanged.

use csv::{Terminator, WriterBuilder};
use rust_xlsxwriter::{Format, Workbook};

use crate::import::{MemberRecord, MemberStore};
use crate::models::Donation;
use crate::utils::errors::{ChurchHubError, Result};
use crate::utils::helpers::format_amount;

pub const MEMBER_HEADERS: [&str; 6] = ["Name", "Surname", "Email", "Phone", "Group", "Role"];
pub const DONATION_HEADERS: [&str; 5] = ["Date", "Donor", "Amount", "Purpose", "Method"];

const TEMPLATE_EXAMPLE: [&str; 6] = ["John", "Doe", "john.doe@example.com", "555-0100", "Youth Cell", "member"];

fn write_csv<'a, I, R>(headers: &[&str], rows: I) -> Result<String>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = &'a str>,
{
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ChurchHubError::Io(e.into_error()))?;

    String::from_utf8(bytes).map_err(|e| ChurchHubError::InvalidInput(e.to_string()))
}

/// Render member records as CSV
pub fn render_members_csv(records: &[MemberRecord]) -> Result<String> {
    write_csv(
        &MEMBER_HEADERS,
        records.iter().map(|record| {
            [
                record.first_name.as_str(),
                record.last_name.as_str(),
                record.email.as_str(),
                record.phone.as_deref().unwrap_or(""),
                record.group_name.as_deref().unwrap_or(""),
                record.role.as_str(),
            ]
        }),
    )
}

/// Export every member, ordered by surname, name, id
pub async fn members_csv<S: MemberStore + ?Sized>(store: &S) -> Result<String> {
    let records = store.list_member_records().await?;
    tracing::info!(members = records.len(), "Exporting members to CSV");
    render_members_csv(&records)
}

/// Blank import template with one example row
pub fn template_csv() -> Result<String> {
    write_csv(&MEMBER_HEADERS, [TEMPLATE_EXAMPLE])
}

/// Spreadsheet template with a bold header row
pub fn template_xlsx() -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Members")?;

    for (col, header) in MEMBER_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
        worksheet.write_string(1, col as u16, TEMPLATE_EXAMPLE[col])?;
        worksheet.set_column_width(col as u16, 20)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Donation report; amounts carry two decimals
pub fn donations_csv(donations: &[Donation]) -> Result<String> {
    let rows: Vec<[String; 5]> = donations
        .iter()
        .map(|d| {
            [
                d.donation_date.format("%Y-%m-%d").to_string(),
                d.donor_name.clone(),
                format_amount(d.amount_cents),
                d.purpose.clone(),
                d.method.clone(),
            ]
        })
        .collect();

    write_csv(
        &DONATION_HEADERS,
        rows.iter().map(|row| row.iter().map(String::as_str)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn record(first: &str, last: &str, email: &str) -> MemberRecord {
        MemberRecord {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            phone: None,
            group_name: None,
            role: "member".to_string(),
        }
    }

    #[test]
    fn test_members_csv_layout() {
        let mut quoted = record("Mary, Jr", "O\"Neil", "mary@example.org");
        quoted.group_name = Some("Youth".to_string());
        let csv = render_members_csv(&[record("Ada", "Lovelace", "ada@example.org"), quoted]).unwrap();

        assert_eq!(
            csv,
            "Name,Surname,Email,Phone,Group,Role\n\
             Ada,Lovelace,ada@example.org,,,member\n\
             \"Mary, Jr\",\"O\"\"Neil\",mary@example.org,,Youth,member\n"
        );
    }

    #[test]
    fn test_template_csv() {
        let csv = template_csv().unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Name,Surname,Email,Phone,Group,Role"));
        assert_eq!(lines.next(), Some("John,Doe,john.doe@example.com,555-0100,Youth Cell,member"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_template_xlsx_reimports() {
        let bytes = template_xlsx().unwrap();
        let table = crate::import::parse_upload("template.xlsx", &bytes).unwrap();

        assert_eq!(table.headers, MEMBER_HEADERS.to_vec());
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], "John");
    }

    #[test]
    fn test_donations_csv() {
        let donation = Donation {
            id: 1,
            donor_id: None,
            donor_name: "Anonymous".to_string(),
            amount_cents: 12050,
            donation_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            purpose: "Building Fund".to_string(),
            method: "Card".to_string(),
            note: None,
            created_at: Utc::now(),
        };

        let csv = donations_csv(&[donation]).unwrap();
        assert_eq!(csv, "Date,Donor,Amount,Purpose,Method\n2024-03-10,Anonymous,120.50,Building Fund,Card\n");
    }
}
