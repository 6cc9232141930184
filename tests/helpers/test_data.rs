//! Test data helpers for building members and upload files

use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rust_xlsxwriter::Workbook;

use ChurchHub::models::CreateMemberRequest;

/// A spreadsheet row as the importer sees it
#[derive(Debug, Clone, PartialEq)]
pub struct TestMember {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub group: Option<String>,
    pub role: Option<String>,
}

impl TestMember {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: None,
            phone: None,
            group: None,
            role: None,
        }
    }

    /// Random member with an email and phone
    pub fn fake() -> Self {
        let first_name: String = FirstName().fake();
        let last_name: String = LastName().fake();
        let email: String = SafeEmail().fake();
        let phone: String = PhoneNumber().fake();

        Self::new(&first_name, &last_name)
            .with_email(&email)
            .with_phone(&phone)
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    pub fn cells(&self) -> [String; 6] {
        [
            self.first_name.clone(),
            self.last_name.clone(),
            self.email.clone().unwrap_or_default(),
            self.phone.clone().unwrap_or_default(),
            self.group.clone().unwrap_or_default(),
            self.role.clone().unwrap_or_default(),
        ]
    }

    pub fn create_request(&self) -> CreateMemberRequest {
        CreateMemberRequest {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone().unwrap_or_else(|| {
                format!("{}.{}@example.org", self.first_name, self.last_name).to_lowercase()
            }),
            phone: self.phone.clone(),
            role: self.role.clone(),
            permissions: None,
            cell_group_id: None,
        }
    }
}

pub const UPLOAD_HEADERS: [&str; 6] = ["Name", "Surname", "Email", "Phone", "Group", "Role"];

/// CSV upload with the standard header row
pub fn members_csv(members: &[TestMember]) -> Vec<u8> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(UPLOAD_HEADERS).expect("write header");
    for member in members {
        writer.write_record(member.cells()).expect("write row");
    }
    writer.into_inner().expect("flush csv")
}

/// XLSX upload with the standard header row on the first sheet
pub fn members_xlsx(members: &[TestMember]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in UPLOAD_HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).expect("write header");
    }
    for (row, member) in members.iter().enumerate() {
        for (col, value) in member.cells().iter().enumerate() {
            if !value.is_empty() {
                sheet.write_string(row as u32 + 1, col as u16, value).expect("write cell");
            }
        }
    }

    workbook.save_to_buffer().expect("save workbook")
}

/// Hand-rolled multipart body; returns (content type, body)
pub fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> (String, Vec<u8>) {
    let boundary = "churchhub-test-boundary";
    let mut body = Vec::new();

    for (name, file_name, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    (format!("multipart/form-data; boundary={}", boundary), body)
}
