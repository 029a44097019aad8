//! Drive REST v3 resources used by the connectors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveUser {
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriveFile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub mime_type: Option<String>,
    pub drive_id: Option<String>,
    pub owned_by_me: Option<bool>,
    pub web_view_link: Option<String>,
    pub web_content_link: Option<String>,
    pub description: Option<String>,
    pub file_extension: Option<String>,
    pub original_filename: Option<String>,
    pub owners: Option<Vec<DriveUser>>,
    pub parents: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileList {
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Permission {
    pub id: Option<String>,
    pub kind: Option<String>,
    #[serde(rename = "type")]
    pub permission_type: Option<String>,
    pub role: Option<String>,
    pub domain: Option<String>,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionList {
    pub permissions: Vec<Permission>,
}

/// File metadata sent on create and update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
}

/// Permission body sent on create and update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<PermissionRole>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub permission_type: Option<PermissionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Raw file content with its content type
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Media {
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionRole {
    Owner,
    Organizer,
    FileOrganizer,
    Writer,
    Commenter,
    #[default]
    Reader,
}

impl PermissionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionRole::Owner => "owner",
            PermissionRole::Organizer => "organizer",
            PermissionRole::FileOrganizer => "fileOrganizer",
            PermissionRole::Writer => "writer",
            PermissionRole::Commenter => "commenter",
            PermissionRole::Reader => "reader",
        }
    }

    /// Granting ownership requires the transferOwnership flag
    pub fn transfers_ownership(&self) -> bool {
        matches!(self, PermissionRole::Owner)
    }
}

impl fmt::Display for PermissionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(PermissionRole::Owner),
            "organizer" => Ok(PermissionRole::Organizer),
            "fileOrganizer" => Ok(PermissionRole::FileOrganizer),
            "writer" => Ok(PermissionRole::Writer),
            "commenter" => Ok(PermissionRole::Commenter),
            "reader" => Ok(PermissionRole::Reader),
            other => Err(format!("unknown permission role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionType {
    #[default]
    User,
    Group,
    Domain,
    Anyone,
}

impl PermissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionType::User => "user",
            PermissionType::Group => "group",
            PermissionType::Domain => "domain",
            PermissionType::Anyone => "anyone",
        }
    }

    pub fn requires_email(&self) -> bool {
        matches!(self, PermissionType::User | PermissionType::Group)
    }

    pub fn requires_domain(&self) -> bool {
        matches!(self, PermissionType::Domain)
    }
}

impl fmt::Display for PermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drive_file_tolerates_partial_responses() {
        let file: DriveFile = serde_json::from_value(json!({
            "id": "1f1Vx",
            "name": "report.pdf",
            "ownedByMe": true,
            "owners": [{"emailAddress": "owner@example.com"}]
        }))
        .unwrap();
        assert_eq!(file.id.as_deref(), Some("1f1Vx"));
        assert_eq!(file.owned_by_me, Some(true));
        assert_eq!(file.web_view_link, None);
        assert_eq!(
            file.owners.unwrap()[0].email_address.as_deref(),
            Some("owner@example.com")
        );
    }

    #[test]
    fn write_models_skip_unset_fields() {
        let metadata = FileMetadata {
            name: Some("invoices".into()),
            mime_type: Some(FOLDER_MIME_TYPE.into()),
            ..FileMetadata::default()
        };
        assert_eq!(
            serde_json::to_value(&metadata).unwrap(),
            json!({"name": "invoices", "mimeType": FOLDER_MIME_TYPE})
        );

        let permission = PermissionRequest {
            role: Some(PermissionRole::FileOrganizer),
            permission_type: Some(PermissionType::Domain),
            domain: Some("example.com".into()),
            ..PermissionRequest::default()
        };
        assert_eq!(
            serde_json::to_value(&permission).unwrap(),
            json!({"role": "fileOrganizer", "type": "domain", "domain": "example.com"})
        );
    }

    #[test]
    fn role_and_type_names() {
        assert_eq!(PermissionRole::default(), PermissionRole::Reader);
        assert_eq!(PermissionType::default(), PermissionType::User);
        assert_eq!(
            "fileOrganizer".parse::<PermissionRole>().unwrap(),
            PermissionRole::FileOrganizer
        );
        assert!("admin".parse::<PermissionRole>().is_err());
        assert!(PermissionRole::Owner.transfers_ownership());
        assert!(PermissionType::Group.requires_email());
        assert!(PermissionType::Domain.requires_domain());
        assert!(!PermissionType::Anyone.requires_email());
    }
}
