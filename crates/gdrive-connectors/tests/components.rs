//! Components driven end to end against a mocked Drive API

use gdrive_connectors::{
    ComponentFactory, ComponentKind, ConnectorError, DriveConfiguration, Processor,
};
use gdrive_core::{FlowContext, Message, MessageBuilder, MimeType, Payload};
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::{json, Value};

fn configuration(server: &MockServer) -> DriveConfiguration {
    DriveConfiguration::with_access_token("test-token").with_base_url(&server.base_url())
}

fn build(server: &MockServer, kind: ComponentKind, properties: Value) -> Box<dyn Processor> {
    match ComponentFactory::new().build(kind, configuration(server), properties) {
        Ok(component) => component,
        Err(e) => panic!("component {} failed to build: {}", kind, e),
    }
}

fn has_pair(pairs: &Option<Vec<(String, String)>>, name: &str) -> bool {
    pairs
        .as_ref()
        .map(|pairs| pairs.iter().any(|(k, _)| k.eq_ignore_ascii_case(name)))
        .unwrap_or(false)
}

fn is_multipart_related(headers: &Option<Vec<(String, String)>>) -> bool {
    headers
        .as_ref()
        .map(|headers| {
            headers.iter().any(|(k, v)| {
                k.eq_ignore_ascii_case("content-type")
                    && v.starts_with("multipart/related; boundary=")
            })
        })
        .unwrap_or(false)
}

fn json_payload(message: &Message) -> &Value {
    match message.payload() {
        Payload::Json(value) => value,
        other => panic!("expected json payload, got {}", other.type_name()),
    }
}

#[tokio::test]
async fn file_create_uploads_multipart_content() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/upload/drive/v3/files")
                .query_param("uploadType", "multipart")
                .query_param("supportsAllDrives", "true")
                .query_param("fields", "id,name,webViewLink,webContentLink")
                .header("authorization", "Bearer test-token")
                .header_exists("content-type")
                .body_contains("\"name\":\"report.txt\"")
                .body_contains("\"mimeType\":\"text/plain\"")
                .body_contains("quarterly numbers");
            then.status(200).json_body(json!({
                "id": "file-1",
                "name": "report.txt",
                "webViewLink": "https://drive.google.com/file/d/file-1/view"
            }));
        })
        .await;

    let component = build(
        &server,
        ComponentKind::FileCreate,
        json!({ "fileName": "report.txt", "mimeType": "text/plain" }),
    );
    let result = component
        .apply(&FlowContext::new(), Message::text("quarterly numbers"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.payload(), &Payload::Text("file-1".into()));
    assert_eq!(result.mime_type().as_str(), "text/plain");
    assert_eq!(result.attributes().get_str("id"), Some("file-1"));
    assert_eq!(result.attributes().get_str("name"), Some("report.txt"));
    assert_eq!(
        result.attributes().get_str("webViewLink"),
        Some("https://drive.google.com/file/d/file-1/view")
    );
    assert_eq!(result.attributes().get("webContentLink"), Some(&Value::Null));
}

#[tokio::test]
async fn file_create_evaluates_name_script() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/upload/drive/v3/files")
                .body_contains("\"name\":\"invoice-42.pdf\"");
            then.status(200).json_body(json!({ "id": "file-42" }));
        })
        .await;

    let component = build(
        &server,
        ComponentKind::FileCreate,
        json!({ "fileName": "#['invoice-' + context.invoice + '.pdf']" }),
    );
    let context = FlowContext::new().with_variable("invoice", "42");
    let result = component
        .apply(&context, Message::binary(vec![1u8, 2, 3]))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.attributes().get_str("id"), Some("file-42"));
}

#[tokio::test]
async fn file_upload_sends_parents_and_inbound_mime() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/upload/drive/v3/files")
                .query_param("uploadType", "multipart")
                .query_param("useContentAsIndexableText", "true")
                .query_param("supportsAllDrives", "true")
                .query_param("fields", "id,name,webViewLink,webContentLink")
                .header("authorization", "Bearer test-token")
                .matches(|req| is_multipart_related(&req.headers))
                .body_contains(
                    "{\"name\":\"scan.pdf\",\"description\":\"Signed copy\",\"parents\":[\"folder-9\"]}",
                )
                .body_contains("Content-Type: application/pdf\r\n\r\n%PDF-1.7");
            then.status(200).json_body(json!({
                "id": "file-7",
                "name": "scan.pdf",
                "webContentLink": "https://drive.google.com/uc?id=file-7"
            }));
        })
        .await;

    let component = build(
        &server,
        ComponentKind::FileUpload,
        json!({
            "fileName": "scan.pdf",
            "fileDescription": "Signed copy",
            "parentFolderId": "#[context.folder]",
            "indexableText": true
        }),
    );
    let context = FlowContext::new().with_variable("folder", "folder-9");
    let inbound = MessageBuilder::new()
        .with_binary(b"%PDF-1.7".to_vec(), MimeType::new("application/pdf"))
        .build();
    let result = component.apply(&context, inbound).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.payload(), &Payload::Text("file-7".into()));
    assert_eq!(result.attributes().get_str("id"), Some("file-7"));
    assert_eq!(
        result.attributes().get_str("webContentLink"),
        Some("https://drive.google.com/uc?id=file-7")
    );
}

#[tokio::test]
async fn file_upload_without_indexable_text_omits_the_flag() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/upload/drive/v3/files")
                .query_param("uploadType", "multipart")
                .query_param("supportsAllDrives", "true")
                .matches(|req| !has_pair(&req.query_params, "useContentAsIndexableText"))
                .matches(|req| is_multipart_related(&req.headers))
                .body_contains("{\"name\":\"notes.txt\"}")
                .body_contains("Content-Type: text/plain\r\n\r\nplain notes");
            then.status(200).json_body(json!({ "id": "file-8" }));
        })
        .await;

    let component = build(
        &server,
        ComponentKind::FileUpload,
        json!({ "fileName": "notes.txt" }),
    );
    let result = component
        .apply(&FlowContext::new(), Message::text("plain notes"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.attributes().get_str("id"), Some("file-8"));
}

#[tokio::test]
async fn folder_create_takes_name_from_payload() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/drive/v3/files")
                .query_param("supportsAllDrives", "true")
                .json_body(json!({
                    "name": "Archive",
                    "mimeType": "application/vnd.google-apps.folder",
                    "parents": ["root-folder"]
                }));
            then.status(200)
                .json_body(json!({ "id": "folder-1", "name": "Archive" }));
        })
        .await;

    let component = build(
        &server,
        ComponentKind::FolderCreate,
        json!({ "parentFolderId": "root-folder" }),
    );
    let result = component
        .apply(&FlowContext::new(), Message::text("  Archive\n"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.payload(), &Payload::Text("folder-1".into()));
    assert_eq!(result.attributes().get_str("name"), Some("Archive"));
}

#[tokio::test]
async fn file_list_maps_files_and_next_page_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/drive/v3/files")
                .query_param("pageSize", "25")
                .query_param("pageToken", "page-2")
                .query_param("driveId", "shared-1")
                .query_param("corpora", "drive")
                .query_param("includeItemsFromAllDrives", "true")
                .query_param("q", "name contains 'report'")
                .query_param("supportsAllDrives", "true");
            then.status(200).json_body(json!({
                "nextPageToken": "page-3",
                "files": [{
                    "id": "file-1",
                    "name": "report.txt",
                    "kind": "drive#file",
                    "mimeType": "text/plain",
                    "ownedByMe": true,
                    "owners": [{ "emailAddress": "owner@example.com" }]
                }]
            }));
        })
        .await;

    let component = build(
        &server,
        ComponentKind::FileList,
        json!({
            "driveId": "shared-1",
            "pageSize": 25,
            "query": "name contains 'report'"
        }),
    );
    let mut inbound = Message::empty();
    inbound
        .attributes_mut()
        .put("nextPageToken", Some("page-2"));
    let result = component.apply(&FlowContext::new(), inbound).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.attributes().get_str("nextPageToken"), Some("page-3"));
    let files = json_payload(&result).as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["id"], "file-1");
    assert_eq!(files[0]["ownedByMe"], true);
    assert_eq!(files[0]["owners"][0]["emailAddress"], "owner@example.com");
    assert_eq!(files[0]["webViewLink"], Value::Null);
}

#[tokio::test]
async fn file_read_returns_binary_content() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/drive/v3/files/file-1")
                .query_param("alt", "media");
            then.status(200).body("hello drive");
        })
        .await;

    let component = build(
        &server,
        ComponentKind::FileRead,
        json!({ "fileId": "file-1", "mimeType": "text/plain" }),
    );
    let result = component
        .apply(&FlowContext::new(), Message::empty())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.payload(), &Payload::Binary(b"hello drive".to_vec()));
    assert_eq!(result.mime_type().as_str(), "text/plain");
    assert_eq!(result.attributes().get_str("fileId"), Some("file-1"));
}

#[tokio::test]
async fn file_download_takes_id_from_payload() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/drive/v3/files/file-9")
                .query_param("alt", "media");
            then.status(200).body(vec![0u8, 159, 146, 150]);
        })
        .await;

    let component = build(&server, ComponentKind::FileDownload, Value::Null);
    let result = component
        .apply(&FlowContext::new(), Message::text("file-9"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.payload(), &Payload::Binary(vec![0u8, 159, 146, 150]));
    assert_eq!(result.mime_type().as_str(), "application/octet-stream");
    assert_eq!(result.attributes().get_str("id"), Some("file-9"));
}

#[tokio::test]
async fn file_update_sends_media_with_inbound_mime() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/upload/drive/v3/files/file-1")
                .query_param("uploadType", "media")
                .query_param("fields", "id")
                .header("content-type", "text/plain")
                .body("new content");
            then.status(200).json_body(json!({ "id": "file-1" }));
        })
        .await;

    let component = build(
        &server,
        ComponentKind::FileUpdate,
        json!({ "fileId": "file-1" }),
    );
    let result = component
        .apply(&FlowContext::new(), Message::text("new content"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.payload(), &Payload::Text("file-1".into()));
    assert_eq!(result.attributes().get_str("id"), Some("file-1"));
}

#[tokio::test]
async fn file_update_metadata_patches_name_and_description() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/drive/v3/files/file-1")
                .query_param("fields", "id,name,description")
                .json_body(json!({ "name": "renamed.txt", "description": "Renamed" }));
            then.status(200).json_body(json!({
                "id": "file-1",
                "name": "renamed.txt",
                "description": "Renamed"
            }));
        })
        .await;

    let component = build(
        &server,
        ComponentKind::FileUpdateMetadata,
        json!({
            "fileId": "#[message.payload()]",
            "fileName": "renamed.txt",
            "fileDescription": "Renamed"
        }),
    );
    let result = component
        .apply(&FlowContext::new(), Message::text("file-1"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.attributes().get_str("name"), Some("renamed.txt"));
    assert_eq!(result.attributes().get_str("description"), Some("Renamed"));
}

#[tokio::test]
async fn file_delete_reports_api_errors() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/drive/v3/files/missing");
            then.status(404).json_body(json!({
                "error": { "code": 404, "message": "File not found: missing." }
            }));
        })
        .await;

    let component = build(
        &server,
        ComponentKind::FileDelete,
        json!({ "fileId": "missing" }),
    );
    let err = component
        .apply(&FlowContext::new(), Message::empty())
        .await
        .err()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        err.to_string(),
        "Could not delete file from Google Drive with configuration fileId=[missing], \
         cause=[File not found: missing.]."
    );
    match err {
        ConnectorError::Operation { status, .. } => assert_eq!(status, Some(404)),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn empty_error_body_falls_back_to_status_reason() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/drive/v3/files/file-1");
            then.status(503);
        })
        .await;

    let component = build(
        &server,
        ComponentKind::FileDelete,
        json!({ "fileId": "file-1" }),
    );
    let err = component
        .apply(&FlowContext::new(), Message::empty())
        .await
        .err()
        .unwrap();

    assert!(err.to_string().ends_with("cause=[Service Unavailable]."));
}

#[tokio::test]
async fn file_delete_returns_deleted_id() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/drive/v3/files/file-1");
            then.status(204);
        })
        .await;

    let component = build(&server, ComponentKind::FileDelete, json!({}));
    let result = component
        .apply(&FlowContext::new(), Message::text("file-1"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.payload(), &Payload::Text("file-1".into()));
    assert_eq!(result.attributes().get_str("id"), Some("file-1"));
}

#[tokio::test]
async fn permission_create_for_user_notifies_when_asked() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/drive/v3/files/file-1/permissions")
                .query_param("fields", "id")
                .query_param("sendNotificationEmail", "true")
                .json_body(json!({
                    "role": "writer",
                    "type": "user",
                    "emailAddress": "colleague@example.com"
                }));
            then.status(200).json_body(json!({ "id": "perm-1" }));
        })
        .await;

    let component = build(
        &server,
        ComponentKind::PermissionCreate,
        json!({
            "role": "writer",
            "type": "user",
            "emailAddress": "colleague@example.com",
            "sendNotificationEmail": true
        }),
    );
    let result = component
        .apply(&FlowContext::new(), Message::text("file-1"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.payload(), &Payload::Text("perm-1".into()));
    assert_eq!(result.attributes().get_str("id"), Some("perm-1"));
    assert_eq!(result.attributes().get_str("fileId"), Some("file-1"));
}

#[tokio::test]
async fn permission_create_for_domain_skips_notification() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/drive/v3/files/file-1/permissions")
                .matches(|req| !has_pair(&req.query_params, "sendNotificationEmail"))
                .json_body(json!({ "role": "reader", "type": "domain", "domain": "example.com" }));
            then.status(200).json_body(json!({ "id": "perm-2" }));
        })
        .await;

    let component = build(
        &server,
        ComponentKind::PermissionCreate,
        json!({ "fileId": "file-1", "type": "domain", "domain": "example.com" }),
    );
    let result = component
        .apply(&FlowContext::new(), Message::empty())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.attributes().get_str("id"), Some("perm-2"));
}

#[tokio::test]
async fn permission_list_projects_listed_fields() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/drive/v3/files/file-1/permissions")
                .query_param("fields", "permissions(id,type,role,domain,displayName,emailAddress)");
            then.status(200).json_body(json!({
                "permissions": [
                    {
                        "id": "perm-1",
                        "type": "user",
                        "role": "owner",
                        "displayName": "Owner Name",
                        "emailAddress": "owner@example.com"
                    },
                    { "id": "anyoneWithLink", "type": "anyone", "role": "reader" }
                ]
            }));
        })
        .await;

    let component = build(
        &server,
        ComponentKind::PermissionList,
        json!({ "fileId": "file-1" }),
    );
    let result = component
        .apply(&FlowContext::new(), Message::empty())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.attributes().get_str("fileId"), Some("file-1"));
    let permissions = json_payload(&result).as_array().unwrap();
    assert_eq!(permissions.len(), 2);
    assert_eq!(permissions[0]["displayName"], "Owner Name");
    assert_eq!(permissions[0]["emailAddress"], "owner@example.com");
    assert_eq!(permissions[1]["type"], "anyone");
    assert_eq!(permissions[1]["domain"], Value::Null);
}

#[tokio::test]
async fn permission_update_sends_role_only() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/drive/v3/files/file-1/permissions/perm-1")
                .query_param("fields", "id,kind,role,type")
                .json_body(json!({ "role": "commenter" }));
            then.status(200).json_body(json!({
                "id": "perm-1",
                "kind": "drive#permission",
                "role": "commenter",
                "type": "user"
            }));
        })
        .await;

    let component = build(
        &server,
        ComponentKind::PermissionUpdate,
        json!({ "fileId": "file-1", "role": "commenter" }),
    );
    let result = component
        .apply(&FlowContext::new(), Message::text("perm-1"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.attributes().get_str("role"), Some("commenter"));
    assert_eq!(result.attributes().get_str("kind"), Some("drive#permission"));
    assert_eq!(result.attributes().get_str("fileId"), Some("file-1"));
}

#[tokio::test]
async fn permission_update_owner_transfers_ownership() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/drive/v3/files/file-1/permissions/perm-1")
                .query_param("transferOwnership", "true");
            then.status(200).json_body(json!({ "id": "perm-1", "role": "owner" }));
        })
        .await;

    let component = build(
        &server,
        ComponentKind::PermissionUpdate,
        json!({ "fileId": "file-1", "permissionId": "perm-1", "role": "owner" }),
    );
    component
        .apply(&FlowContext::new(), Message::empty())
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn permission_delete_returns_permission_id() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/drive/v3/files/file-1/permissions/perm-1");
            then.status(204);
        })
        .await;

    let component = build(
        &server,
        ComponentKind::PermissionDelete,
        json!({ "fileId": "file-1" }),
    );
    let result = component
        .apply(&FlowContext::new(), Message::text("perm-1"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.payload(), &Payload::Text("perm-1".into()));
    assert_eq!(result.attributes().get_str("id"), Some("perm-1"));
    assert_eq!(result.attributes().get_str("fileId"), Some("file-1"));
}

#[tokio::test]
async fn unsupported_payload_is_rejected_before_calling_drive() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(500);
        })
        .await;

    let component = build(&server, ComponentKind::FileDelete, json!({}));
    let err = component
        .apply(&FlowContext::new(), Message::empty())
        .await
        .err()
        .unwrap();

    assert!(err.to_string().starts_with("The payload type is not supported"));
    assert_eq!(mock.hits_async().await, 0);
}
