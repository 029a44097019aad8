use super::{describe, failure, require_not_blank, show, Command};
use crate::client::{CreateFileOptions, DriveClient};
use crate::error::{ClientError, ClientResult, ConnectorError, ConnectorResult, DriveOperation};
use crate::mapper::{fields_mask, CREATED_FILE_ATTRIBUTES};
use crate::model::{DriveFile, FileMetadata, FOLDER_MIME_TYPE};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct FolderCreateCommand {
    folder_name: String,
    folder_description: Option<String>,
    parent_folder_id: Option<String>,
}

impl FolderCreateCommand {
    pub fn new(
        folder_name: impl Into<String>,
        folder_description: Option<String>,
        parent_folder_id: Option<String>,
    ) -> ConnectorResult<Self> {
        let folder_name = folder_name.into();
        require_not_blank(DriveOperation::FolderCreate, "folder name", &folder_name)?;
        Ok(Self {
            folder_name,
            folder_description,
            parent_folder_id: parent_folder_id.filter(|p| !p.trim().is_empty()),
        })
    }
}

#[async_trait]
impl Command for FolderCreateCommand {
    type Output = DriveFile;

    fn operation(&self) -> DriveOperation {
        DriveOperation::FolderCreate
    }

    async fn execute(&self, client: &DriveClient) -> ClientResult<DriveFile> {
        let metadata = FileMetadata {
            name: Some(self.folder_name.clone()),
            description: self.folder_description.clone(),
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
            parents: self.parent_folder_id.clone().map(|p| vec![p]),
        };
        let options = CreateFileOptions {
            fields: fields_mask(CREATED_FILE_ATTRIBUTES),
            use_content_as_indexable_text: false,
        };
        client.create_file(&metadata, None, &options).await
    }

    fn on_error(&self, error: ClientError) -> ConnectorError {
        let message = describe(
            "create folder on Google Drive",
            &[
                ("folderName", self.folder_name.clone()),
                ("folderDescription", show(&self.folder_description)),
                ("parentFolderId", show(&self.parent_folder_id)),
            ],
            &error.cause(),
        );
        failure(self.operation(), &error, message)
    }
}
