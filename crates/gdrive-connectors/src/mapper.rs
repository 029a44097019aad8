//! Drive resources to flat attribute maps
//!
//! Field masks are derived from the same key lists the mappers read, so every
//! request asks Drive for exactly the fields that end up in the output.

use crate::model::{DriveFile, DriveUser, Permission};
use gdrive_core::Attributes;
use serde_json::{json, Map, Value as JsonValue};

pub mod keys {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const KIND: &str = "kind";
    pub const MIME_TYPE: &str = "mimeType";
    pub const DRIVE_ID: &str = "driveId";
    pub const OWNED_BY_ME: &str = "ownedByMe";
    pub const WEB_VIEW_LINK: &str = "webViewLink";
    pub const WEB_CONTENT_LINK: &str = "webContentLink";
    pub const DESCRIPTION: &str = "description";
    pub const FILE_EXTENSION: &str = "fileExtension";
    pub const ORIGINAL_FILENAME: &str = "originalFilename";
    pub const OWNERS: &str = "owners";
    pub const EMAIL_ADDRESS: &str = "emailAddress";
    pub const TYPE: &str = "type";
    pub const ROLE: &str = "role";
    pub const DOMAIN: &str = "domain";
    pub const DISPLAY_NAME: &str = "displayName";
    pub const FILE_ID: &str = "fileId";
    pub const NEXT_PAGE_TOKEN: &str = "nextPageToken";
}

use keys::*;

/// Attributes of create, upload and folder create
pub const CREATED_FILE_ATTRIBUTES: &[&str] = &[ID, NAME, WEB_VIEW_LINK, WEB_CONTENT_LINK];
pub const UPDATED_METADATA_ATTRIBUTES: &[&str] = &[ID, NAME, DESCRIPTION];
pub const UPDATED_CONTENT_ATTRIBUTES: &[&str] = &[ID];
pub const PERMISSION_CREATE_ATTRIBUTES: &[&str] = &[ID];
pub const PERMISSION_UPDATE_ATTRIBUTES: &[&str] = &[ID, KIND, ROLE, TYPE];

/// Keys of each file in a listing
pub const LISTED_FILE_FIELDS: &[&str] = &[
    ID,
    NAME,
    KIND,
    MIME_TYPE,
    DRIVE_ID,
    OWNED_BY_ME,
    WEB_VIEW_LINK,
    WEB_CONTENT_LINK,
    DESCRIPTION,
    FILE_EXTENSION,
    ORIGINAL_FILENAME,
    OWNERS,
];

/// Keys of each permission in a listing
pub const PERMISSION_FIELDS: &[&str] = &[ID, TYPE, ROLE, DOMAIN, DISPLAY_NAME, EMAIL_ADDRESS];

fn mask_field(key: &str) -> String {
    if key == OWNERS {
        format!("{}({})", OWNERS, EMAIL_ADDRESS)
    } else {
        key.to_string()
    }
}

/// Comma-separated field mask for a single resource
pub fn fields_mask(keys: &[&str]) -> String {
    keys.iter().map(|k| mask_field(k)).collect::<Vec<_>>().join(",")
}

pub fn file_list_mask() -> String {
    format!("{},files({})", NEXT_PAGE_TOKEN, fields_mask(LISTED_FILE_FIELDS))
}

pub fn permission_list_mask() -> String {
    format!("permissions({})", fields_mask(PERMISSION_FIELDS))
}

fn user_to_json(user: &DriveUser) -> JsonValue {
    json!({ EMAIL_ADDRESS: user.email_address })
}

/// Full map of a file; absent fields are kept as null
pub fn file_to_map(file: &DriveFile) -> Map<String, JsonValue> {
    let mut map = Map::new();
    map.insert(ID.into(), json!(file.id));
    map.insert(NAME.into(), json!(file.name));
    map.insert(KIND.into(), json!(file.kind));
    map.insert(MIME_TYPE.into(), json!(file.mime_type));
    map.insert(DRIVE_ID.into(), json!(file.drive_id));
    map.insert(OWNED_BY_ME.into(), json!(file.owned_by_me));
    map.insert(WEB_VIEW_LINK.into(), json!(file.web_view_link));
    map.insert(WEB_CONTENT_LINK.into(), json!(file.web_content_link));
    map.insert(DESCRIPTION.into(), json!(file.description));
    map.insert(FILE_EXTENSION.into(), json!(file.file_extension));
    map.insert(ORIGINAL_FILENAME.into(), json!(file.original_filename));
    if let Some(owners) = &file.owners {
        map.insert(
            OWNERS.into(),
            JsonValue::Array(owners.iter().map(user_to_json).collect()),
        );
    }
    map
}

pub fn permission_to_map(permission: &Permission) -> Map<String, JsonValue> {
    let mut map = Map::new();
    map.insert(ID.into(), json!(permission.id));
    map.insert(KIND.into(), json!(permission.kind));
    map.insert(TYPE.into(), json!(permission.permission_type));
    map.insert(ROLE.into(), json!(permission.role));
    map.insert(DOMAIN.into(), json!(permission.domain));
    map.insert(DISPLAY_NAME.into(), json!(permission.display_name));
    map.insert(EMAIL_ADDRESS.into(), json!(permission.email_address));
    map
}

/// Listing entry restricted to the listed permission fields
pub fn listed_permission(permission: &Permission) -> JsonValue {
    let full = permission_to_map(permission);
    JsonValue::Object(
        PERMISSION_FIELDS
            .iter()
            .map(|k| (k.to_string(), full.get(*k).cloned().unwrap_or(JsonValue::Null)))
            .collect(),
    )
}

fn pick(map: &Map<String, JsonValue>, keys: &[&str]) -> Attributes {
    keys.iter()
        .map(|k| (k.to_string(), map.get(*k).cloned().unwrap_or(JsonValue::Null)))
        .collect()
}

pub fn file_attributes(file: &DriveFile, keys: &[&str]) -> Attributes {
    pick(&file_to_map(file), keys)
}

pub fn permission_attributes(permission: &Permission, keys: &[&str]) -> Attributes {
    pick(&permission_to_map(permission), keys)
}
