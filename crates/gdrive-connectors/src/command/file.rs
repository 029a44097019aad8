use super::{describe, failure, require_not_blank, show, Command};
use crate::client::{CreateFileOptions, DriveClient, ListFilesRequest};
use crate::error::{ClientError, ClientResult, ConnectorError, ConnectorResult, DriveOperation};
use crate::mapper::{
    fields_mask, file_list_mask, CREATED_FILE_ATTRIBUTES, UPDATED_CONTENT_ATTRIBUTES,
    UPDATED_METADATA_ATTRIBUTES,
};
use crate::model::{DriveFile, FileList, FileMetadata, Media};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct FileCreateCommand {
    file_name: String,
    file_description: Option<String>,
    mime_type: String,
    indexable_text: bool,
    content: Vec<u8>,
}

impl FileCreateCommand {
    pub fn new(
        file_name: impl Into<String>,
        file_description: Option<String>,
        mime_type: impl Into<String>,
        indexable_text: bool,
        content: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_description,
            mime_type: mime_type.into(),
            indexable_text,
            content,
        }
    }
}

#[async_trait]
impl Command for FileCreateCommand {
    type Output = DriveFile;

    fn operation(&self) -> DriveOperation {
        DriveOperation::FileCreate
    }

    async fn execute(&self, client: &DriveClient) -> ClientResult<DriveFile> {
        let metadata = FileMetadata {
            name: Some(self.file_name.clone()),
            description: self.file_description.clone(),
            mime_type: Some(self.mime_type.clone()),
            parents: None,
        };
        let media = Media::new(self.mime_type.clone(), self.content.clone());
        let options = CreateFileOptions {
            fields: fields_mask(CREATED_FILE_ATTRIBUTES),
            use_content_as_indexable_text: self.indexable_text,
        };
        client.create_file(&metadata, Some(&media), &options).await
    }

    fn on_error(&self, error: ClientError) -> ConnectorError {
        let message = describe(
            "create file on Google Drive",
            &[
                ("fileName", self.file_name.clone()),
                ("fileDescription", show(&self.file_description)),
                ("mimeType", self.mime_type.clone()),
                ("indexableText", self.indexable_text.to_string()),
            ],
            &error.cause(),
        );
        failure(self.operation(), &error, message)
    }
}

#[derive(Debug, Clone)]
pub struct FileUploadCommand {
    file_name: String,
    file_description: Option<String>,
    parent_folder_id: Option<String>,
    indexable_text: bool,
    content_type: String,
    content: Vec<u8>,
}

impl FileUploadCommand {
    pub fn new(
        file_name: impl Into<String>,
        file_description: Option<String>,
        parent_folder_id: Option<String>,
        indexable_text: bool,
        content_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_description,
            parent_folder_id: parent_folder_id.filter(|p| !p.trim().is_empty()),
            indexable_text,
            content_type: content_type.into(),
            content,
        }
    }
}

#[async_trait]
impl Command for FileUploadCommand {
    type Output = DriveFile;

    fn operation(&self) -> DriveOperation {
        DriveOperation::FileUpload
    }

    async fn execute(&self, client: &DriveClient) -> ClientResult<DriveFile> {
        let metadata = FileMetadata {
            name: Some(self.file_name.clone()),
            description: self.file_description.clone(),
            mime_type: None,
            parents: self.parent_folder_id.clone().map(|p| vec![p]),
        };
        let media = Media::new(self.content_type.clone(), self.content.clone());
        let options = CreateFileOptions {
            fields: fields_mask(CREATED_FILE_ATTRIBUTES),
            use_content_as_indexable_text: self.indexable_text,
        };
        client.create_file(&metadata, Some(&media), &options).await
    }

    fn on_error(&self, error: ClientError) -> ConnectorError {
        let message = describe(
            "upload file on Google Drive",
            &[
                ("fileName", self.file_name.clone()),
                ("fileDescription", show(&self.file_description)),
                ("indexableText", self.indexable_text.to_string()),
                ("parentFolderId", show(&self.parent_folder_id)),
            ],
            &error.cause(),
        );
        failure(self.operation(), &error, message)
    }
}

#[derive(Debug, Clone)]
pub struct FileListCommand {
    drive_id: Option<String>,
    order_by: Option<String>,
    page_size: u32,
    next_page_token: Option<String>,
    query: Option<String>,
}

impl FileListCommand {
    pub fn new(
        drive_id: Option<String>,
        order_by: Option<String>,
        page_size: u32,
        next_page_token: Option<String>,
        query: Option<String>,
    ) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            drive_id: non_blank(drive_id),
            order_by: non_blank(order_by),
            page_size,
            next_page_token: non_blank(next_page_token),
            query: non_blank(query),
        }
    }
}

#[async_trait]
impl Command for FileListCommand {
    type Output = FileList;

    fn operation(&self) -> DriveOperation {
        DriveOperation::FileList
    }

    async fn execute(&self, client: &DriveClient) -> ClientResult<FileList> {
        let request = ListFilesRequest {
            page_size: self.page_size,
            page_token: self.next_page_token.clone(),
            drive_id: self.drive_id.clone(),
            order_by: self.order_by.clone(),
            query: self.query.clone(),
            fields: file_list_mask(),
        };
        client.list_files(&request).await
    }

    fn on_error(&self, error: ClientError) -> ConnectorError {
        let message = describe(
            "list files from Google Drive",
            &[
                ("query", show(&self.query)),
                ("orderBy", show(&self.order_by)),
                ("driveId", show(&self.drive_id)),
                ("nextPageToken", show(&self.next_page_token)),
                ("pageSize", self.page_size.to_string()),
            ],
            &error.cause(),
        );
        failure(self.operation(), &error, message)
    }
}

/// Downloads file content; shared by the read and download commands
async fn download(client: &DriveClient, file_id: &str) -> ClientResult<Vec<u8>> {
    client.download_file(file_id).await
}

#[derive(Debug, Clone)]
pub struct FileReadCommand {
    file_id: String,
}

impl FileReadCommand {
    pub fn new(file_id: impl Into<String>) -> ConnectorResult<Self> {
        let file_id = file_id.into();
        require_not_blank(DriveOperation::FileRead, "File ID", &file_id)?;
        Ok(Self { file_id })
    }
}

#[async_trait]
impl Command for FileReadCommand {
    type Output = Vec<u8>;

    fn operation(&self) -> DriveOperation {
        DriveOperation::FileRead
    }

    async fn execute(&self, client: &DriveClient) -> ClientResult<Vec<u8>> {
        download(client, &self.file_id).await
    }

    fn on_error(&self, error: ClientError) -> ConnectorError {
        let message = describe(
            "read file from Google Drive",
            &[("fileId", self.file_id.clone())],
            &error.cause(),
        );
        failure(self.operation(), &error, message)
    }
}

#[derive(Debug, Clone)]
pub struct FileDownloadCommand {
    file_id: String,
}

impl FileDownloadCommand {
    pub fn new(file_id: impl Into<String>) -> ConnectorResult<Self> {
        let file_id = file_id.into();
        require_not_blank(DriveOperation::FileDownload, "File ID", &file_id)?;
        Ok(Self { file_id })
    }
}

#[async_trait]
impl Command for FileDownloadCommand {
    type Output = Vec<u8>;

    fn operation(&self) -> DriveOperation {
        DriveOperation::FileDownload
    }

    async fn execute(&self, client: &DriveClient) -> ClientResult<Vec<u8>> {
        download(client, &self.file_id).await
    }

    fn on_error(&self, error: ClientError) -> ConnectorError {
        let message = describe(
            "download file from Google Drive",
            &[("fileId", self.file_id.clone())],
            &error.cause(),
        );
        failure(self.operation(), &error, message)
    }
}

#[derive(Debug, Clone)]
pub struct FileUpdateCommand {
    file_id: String,
    mime_type: String,
    content: Vec<u8>,
}

impl FileUpdateCommand {
    pub fn new(
        file_id: impl Into<String>,
        mime_type: impl Into<String>,
        content: Vec<u8>,
    ) -> ConnectorResult<Self> {
        let file_id = file_id.into();
        require_not_blank(DriveOperation::FileUpdate, "File ID", &file_id)?;
        Ok(Self {
            file_id,
            mime_type: mime_type.into(),
            content,
        })
    }
}

#[async_trait]
impl Command for FileUpdateCommand {
    type Output = DriveFile;

    fn operation(&self) -> DriveOperation {
        DriveOperation::FileUpdate
    }

    async fn execute(&self, client: &DriveClient) -> ClientResult<DriveFile> {
        let media = Media::new(self.mime_type.clone(), self.content.clone());
        client
            .update_file_content(&self.file_id, &media, &fields_mask(UPDATED_CONTENT_ATTRIBUTES))
            .await
    }

    fn on_error(&self, error: ClientError) -> ConnectorError {
        let message = describe(
            "update file content on Google Drive",
            &[
                ("fileId", self.file_id.clone()),
                ("mimeType", self.mime_type.clone()),
            ],
            &error.cause(),
        );
        failure(self.operation(), &error, message)
    }
}

#[derive(Debug, Clone)]
pub struct FileUpdateMetadataCommand {
    file_id: String,
    file_name: Option<String>,
    file_description: Option<String>,
}

impl FileUpdateMetadataCommand {
    pub fn new(
        file_id: impl Into<String>,
        file_name: Option<String>,
        file_description: Option<String>,
    ) -> ConnectorResult<Self> {
        let file_id = file_id.into();
        require_not_blank(DriveOperation::FileUpdateMetadata, "File ID", &file_id)?;
        Ok(Self {
            file_id,
            file_name,
            file_description,
        })
    }
}

#[async_trait]
impl Command for FileUpdateMetadataCommand {
    type Output = DriveFile;

    fn operation(&self) -> DriveOperation {
        DriveOperation::FileUpdateMetadata
    }

    async fn execute(&self, client: &DriveClient) -> ClientResult<DriveFile> {
        let metadata = FileMetadata {
            name: self.file_name.clone(),
            description: self.file_description.clone(),
            ..FileMetadata::default()
        };
        client
            .update_file_metadata(
                &self.file_id,
                &metadata,
                &fields_mask(UPDATED_METADATA_ATTRIBUTES),
            )
            .await
    }

    fn on_error(&self, error: ClientError) -> ConnectorError {
        let message = describe(
            "update file metadata on Google Drive",
            &[
                ("fileId", self.file_id.clone()),
                ("fileName", show(&self.file_name)),
                ("fileDescription", show(&self.file_description)),
            ],
            &error.cause(),
        );
        failure(self.operation(), &error, message)
    }
}

#[derive(Debug, Clone)]
pub struct FileDeleteCommand {
    file_id: String,
}

impl FileDeleteCommand {
    pub fn new(file_id: impl Into<String>) -> ConnectorResult<Self> {
        let file_id = file_id.into();
        require_not_blank(DriveOperation::FileDelete, "File ID", &file_id)?;
        Ok(Self { file_id })
    }
}

#[async_trait]
impl Command for FileDeleteCommand {
    type Output = ();

    fn operation(&self) -> DriveOperation {
        DriveOperation::FileDelete
    }

    async fn execute(&self, client: &DriveClient) -> ClientResult<()> {
        client.delete_file(&self.file_id).await
    }

    fn on_error(&self, error: ClientError) -> ConnectorError {
        let message = describe(
            "delete file from Google Drive",
            &[("fileId", self.file_id.clone())],
            &error.cause(),
        );
        failure(self.operation(), &error, message)
    }
}
