//! Drive REST v3 client handle
//!
//! `DriveClient` is the only place that talks HTTP. Every request carries a bearer
//! token and `supportsAllDrives=true`; non-2xx responses are decoded from Google's
//! error envelope into [`ClientError::Api`].

pub mod body_builder;
pub mod client_cache;

pub use body_builder::{BodyBuilder, RelatedBody};
pub use client_cache::ClientCache;

use crate::auth::{
    AccessTokenProvider, ServiceAccountKey, ServiceAccountTokenProvider, StaticTokenProvider,
};
use crate::config::DriveConfiguration;
use crate::error::{ClientError, ClientResult, ConnectorError, ConnectorResult};
use crate::model::{
    DriveFile, FileList, FileMetadata, Media, Permission, PermissionList, PermissionRequest,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

/// Options for `files.create`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateFileOptions {
    pub fields: String,
    pub use_content_as_indexable_text: bool,
}

/// Query for `files.list`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilesRequest {
    pub page_size: u32,
    pub page_token: Option<String>,
    pub drive_id: Option<String>,
    pub order_by: Option<String>,
    pub query: Option<String>,
    pub fields: String,
}

/// Options for `permissions.create`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PermissionOptions {
    pub send_notification_email: Option<bool>,
    pub transfer_ownership: bool,
    pub fields: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DriveClient {
    http: Arc<Client>,
    api_base_url: String,
    upload_base_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl DriveClient {
    pub fn new(
        http: Arc<Client>,
        api_base_url: impl Into<String>,
        upload_base_url: impl Into<String>,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            http,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            upload_base_url: upload_base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Build a client from configuration, reading the credentials file if one is set
    pub fn from_configuration(configuration: &DriveConfiguration) -> ConnectorResult<Self> {
        configuration.validate()?;
        let http = ClientCache::global().get_client(configuration)?;

        let tokens: Arc<dyn AccessTokenProvider> = match (
            configuration.access_token.as_deref(),
            configuration.credentials_file.as_deref(),
        ) {
            (Some(token), _) => Arc::new(StaticTokenProvider::new(token)),
            (None, Some(path)) => {
                let key = ServiceAccountKey::from_file(path)?;
                Arc::new(ServiceAccountTokenProvider::new(
                    key,
                    &configuration.scopes,
                    configuration.credentials_email.clone(),
                    http.clone(),
                ))
            }
            (None, None) => {
                return Err(ConnectorError::InvalidConfig(
                    "Google Drive Configuration must provide a credentials file or an access token"
                        .to_string(),
                ))
            }
        };

        Ok(Self::new(
            http,
            configuration.api_base_url.clone(),
            configuration.upload_base_url.clone(),
            tokens,
        ))
    }

    fn file_url(&self, base: &str, file_id: &str) -> String {
        format!("{}/files/{}", base, urlencoding::encode(file_id))
    }

    fn permissions_url(&self, file_id: &str) -> String {
        format!("{}/permissions", self.file_url(&self.api_base_url, file_id))
    }

    async fn authorize(&self, builder: RequestBuilder) -> ClientResult<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(builder
            .bearer_auth(token)
            .query(&[("supportsAllDrives", "true")]))
    }

    async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let response = self.authorize(builder).await?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "could not read error response body");
                String::new()
            }
        };
        let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => envelope.error.message.unwrap_or_else(|| {
                format!("HTTP {}", envelope.error.code.unwrap_or(status.as_u16()))
            }),
            Err(_) if !body.trim().is_empty() => body,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        tracing::warn!(status = status.as_u16(), %message, "Drive API request failed");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let bytes = self.send(builder).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> ClientResult<()> {
        self.send(builder).await?;
        Ok(())
    }

    /// `files.create`; multipart upload when media is present, metadata only otherwise
    pub async fn create_file(
        &self,
        metadata: &FileMetadata,
        media: Option<&Media>,
        options: &CreateFileOptions,
    ) -> ClientResult<DriveFile> {
        let mut query: Vec<(&str, String)> = vec![("fields", options.fields.clone())];
        if options.use_content_as_indexable_text {
            query.push(("useContentAsIndexableText", "true".to_string()));
        }

        let builder = match media {
            Some(media) => {
                let body = BodyBuilder::multipart_related(metadata, media)?;
                self.http
                    .post(format!("{}/files", self.upload_base_url))
                    .query(&[("uploadType", "multipart")])
                    .query(&query)
                    .header(CONTENT_TYPE, body.content_type)
                    .body(body.bytes)
            }
            None => self
                .http
                .post(format!("{}/files", self.api_base_url))
                .query(&query)
                .json(metadata),
        };
        self.send_json(builder).await
    }

    pub async fn list_files(&self, request: &ListFilesRequest) -> ClientResult<FileList> {
        let mut query: Vec<(&str, String)> = vec![
            ("pageSize", request.page_size.to_string()),
            ("fields", request.fields.clone()),
        ];
        if let Some(token) = &request.page_token {
            query.push(("pageToken", token.clone()));
        }
        if let Some(drive_id) = &request.drive_id {
            query.push(("driveId", drive_id.clone()));
            query.push(("corpora", "drive".to_string()));
            query.push(("includeItemsFromAllDrives", "true".to_string()));
        }
        if let Some(order_by) = &request.order_by {
            query.push(("orderBy", order_by.clone()));
        }
        if let Some(q) = &request.query {
            query.push(("q", q.clone()));
        }

        let builder = self
            .http
            .get(format!("{}/files", self.api_base_url))
            .query(&query);
        self.send_json(builder).await
    }

    /// Download file content (`alt=media`)
    pub async fn download_file(&self, file_id: &str) -> ClientResult<Vec<u8>> {
        let builder = self
            .http
            .get(self.file_url(&self.api_base_url, file_id))
            .query(&[("alt", "media")]);
        let bytes = self.send(builder).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    pub async fn update_file_content(
        &self,
        file_id: &str,
        media: &Media,
        fields: &str,
    ) -> ClientResult<DriveFile> {
        let builder = self
            .http
            .patch(self.file_url(&self.upload_base_url, file_id))
            .query(&[("uploadType", "media"), ("fields", fields)])
            .header(CONTENT_TYPE, media.content_type.as_str())
            .body(media.bytes.clone());
        self.send_json(builder).await
    }

    pub async fn update_file_metadata(
        &self,
        file_id: &str,
        metadata: &FileMetadata,
        fields: &str,
    ) -> ClientResult<DriveFile> {
        let builder = self
            .http
            .patch(self.file_url(&self.api_base_url, file_id))
            .query(&[("fields", fields)])
            .json(metadata);
        self.send_json(builder).await
    }

    pub async fn delete_file(&self, file_id: &str) -> ClientResult<()> {
        let builder = self.http.delete(self.file_url(&self.api_base_url, file_id));
        self.send_empty(builder).await
    }

    pub async fn create_permission(
        &self,
        file_id: &str,
        permission: &PermissionRequest,
        options: &PermissionOptions,
    ) -> ClientResult<Permission> {
        let mut query: Vec<(&str, String)> = vec![("fields", options.fields.clone())];
        if let Some(notify) = options.send_notification_email {
            query.push(("sendNotificationEmail", notify.to_string()));
        }
        if options.transfer_ownership {
            query.push(("transferOwnership", "true".to_string()));
        }

        let builder = self
            .http
            .post(self.permissions_url(file_id))
            .query(&query)
            .json(permission);
        self.send_json(builder).await
    }

    /// Single page of permissions; Drive returns all of them by default
    pub async fn list_permissions(
        &self,
        file_id: &str,
        fields: &str,
    ) -> ClientResult<PermissionList> {
        let builder = self
            .http
            .get(self.permissions_url(file_id))
            .query(&[("fields", fields)]);
        self.send_json(builder).await
    }

    pub async fn update_permission(
        &self,
        file_id: &str,
        permission_id: &str,
        permission: &PermissionRequest,
        transfer_ownership: bool,
        fields: &str,
    ) -> ClientResult<Permission> {
        let mut builder = self
            .http
            .patch(format!(
                "{}/{}",
                self.permissions_url(file_id),
                urlencoding::encode(permission_id)
            ))
            .query(&[("fields", fields)]);
        if transfer_ownership {
            builder = builder.query(&[("transferOwnership", "true")]);
        }
        self.send_json(builder.json(permission)).await
    }

    pub async fn delete_permission(&self, file_id: &str, permission_id: &str) -> ClientResult<()> {
        let builder = self.http.delete(format!(
            "{}/{}",
            self.permissions_url(file_id),
            urlencoding::encode(permission_id)
        ));
        self.send_empty(builder).await
    }
}
