use super::{
    evaluate, evaluate_required, id_message, identifier, require_configured, validate_scripts,
    Processor,
};
use crate::command::{
    DriveApi, DriveApiFactory, FileCreateCommand, FileDeleteCommand, FileDownloadCommand,
    FileListCommand, FileReadCommand, FileUpdateCommand, FileUpdateMetadataCommand,
    FileUploadCommand,
};
use crate::config::DriveConfiguration;
use crate::error::{ConnectorError, ConnectorResult, DriveOperation};
use crate::mapper::{self, keys, CREATED_FILE_ATTRIBUTES, UPDATED_METADATA_ATTRIBUTES};
use async_trait::async_trait;
use gdrive_core::{
    converter, Attributes, DynamicValue, FlowContext, Message, MessageBuilder, MimeType,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_NEXT_PAGE_TOKEN: &str = "#[message.attributes().nextPageToken]";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileCreateConfig {
    #[serde(default)]
    pub file_name: DynamicValue,
    #[serde(default)]
    pub file_description: DynamicValue,
    /// Content type of the created file, `application/octet-stream` when unset
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub indexable_text: bool,
}

pub struct FileCreate {
    config: FileCreateConfig,
    mime_type: MimeType,
    api: DriveApi,
}

impl FileCreate {
    pub fn new(
        configuration: DriveConfiguration,
        config: FileCreateConfig,
    ) -> ConnectorResult<Self> {
        let operation = DriveOperation::FileCreate;
        require_configured(operation, "Google Drive File name", &config.file_name)?;
        validate_scripts(
            operation,
            &[
                ("fileName", &config.file_name),
                ("fileDescription", &config.file_description),
            ],
        )?;
        let mime_type = MimeType::parse(config.mime_type.as_deref(), MimeType::APPLICATION_BINARY);
        let api = DriveApiFactory::create(operation.as_str(), &configuration)?;
        Ok(Self {
            config,
            mime_type,
            api,
        })
    }
}

#[async_trait]
impl Processor for FileCreate {
    fn name(&self) -> &'static str {
        DriveOperation::FileCreate.as_str()
    }

    async fn apply(&self, context: &FlowContext, message: Message) -> ConnectorResult<Message> {
        let operation = DriveOperation::FileCreate;
        let file_name = evaluate(&self.config.file_name, context, &message)?.ok_or_else(|| {
            ConnectorError::operation(
                operation,
                format!(
                    "The file name to be created on Google Drive must not be empty (DynamicValue=[{}]).",
                    self.config.file_name
                ),
            )
        })?;
        let file_description = evaluate(&self.config.file_description, context, &message)?;
        let content = converter::to_bytes(message.payload())?;

        let command = FileCreateCommand::new(
            file_name,
            file_description,
            self.mime_type.as_str(),
            self.config.indexable_text,
            content,
        );
        let file = self.api.execute(&command).await?;

        Ok(id_message(
            operation,
            file.id.clone(),
            mapper::file_attributes(&file, CREATED_FILE_ATTRIBUTES),
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileUploadConfig {
    #[serde(default)]
    pub file_name: DynamicValue,
    #[serde(default)]
    pub file_description: DynamicValue,
    #[serde(default)]
    pub parent_folder_id: DynamicValue,
    #[serde(default)]
    pub indexable_text: bool,
}

pub struct FileUpload {
    config: FileUploadConfig,
    api: DriveApi,
}

impl FileUpload {
    pub fn new(
        configuration: DriveConfiguration,
        config: FileUploadConfig,
    ) -> ConnectorResult<Self> {
        let operation = DriveOperation::FileUpload;
        require_configured(operation, "Google Drive File name", &config.file_name)?;
        validate_scripts(
            operation,
            &[
                ("fileName", &config.file_name),
                ("fileDescription", &config.file_description),
                ("parentFolderId", &config.parent_folder_id),
            ],
        )?;
        let api = DriveApiFactory::create(operation.as_str(), &configuration)?;
        Ok(Self { config, api })
    }
}

#[async_trait]
impl Processor for FileUpload {
    fn name(&self) -> &'static str {
        DriveOperation::FileUpload.as_str()
    }

    async fn apply(&self, context: &FlowContext, message: Message) -> ConnectorResult<Message> {
        let operation = DriveOperation::FileUpload;
        let file_name =
            evaluate_required(operation, "file name", &self.config.file_name, context, &message)?;
        let file_description = evaluate(&self.config.file_description, context, &message)?;
        let parent_folder_id = evaluate(&self.config.parent_folder_id, context, &message)?;
        let content = converter::to_bytes(message.payload())?;

        let command = FileUploadCommand::new(
            file_name,
            file_description,
            parent_folder_id,
            self.config.indexable_text,
            message.mime_type().as_str(),
            content,
        );
        let file = self.api.execute(&command).await?;

        Ok(id_message(
            operation,
            file.id.clone(),
            mapper::file_attributes(&file, CREATED_FILE_ATTRIBUTES),
        ))
    }
}

fn default_next_page_token() -> DynamicValue {
    DynamicValue::from(DEFAULT_NEXT_PAGE_TOKEN)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileListConfig {
    /// Shared drive to search
    #[serde(default)]
    pub drive_id: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default = "default_next_page_token")]
    pub next_page_token: DynamicValue,
    /// Drive search query, e.g. `name contains 'invoice'`
    #[serde(default)]
    pub query: DynamicValue,
    #[serde(default)]
    pub order_by: Option<String>,
}

impl Default for FileListConfig {
    fn default() -> Self {
        Self {
            drive_id: None,
            page_size: None,
            next_page_token: default_next_page_token(),
            query: DynamicValue::none(),
            order_by: None,
        }
    }
}

pub struct FileList {
    config: FileListConfig,
    page_size: u32,
    api: DriveApi,
}

impl FileList {
    pub fn new(configuration: DriveConfiguration, config: FileListConfig) -> ConnectorResult<Self> {
        let operation = DriveOperation::FileList;
        let page_size = config.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConnectorError::config(
                operation,
                format!(
                    "Page size must be between 1 and {} (was {}).",
                    MAX_PAGE_SIZE, page_size
                ),
            ));
        }
        validate_scripts(
            operation,
            &[
                ("nextPageToken", &config.next_page_token),
                ("query", &config.query),
            ],
        )?;
        let api = DriveApiFactory::create(operation.as_str(), &configuration)?;
        Ok(Self {
            config,
            page_size,
            api,
        })
    }
}

#[async_trait]
impl Processor for FileList {
    fn name(&self) -> &'static str {
        DriveOperation::FileList.as_str()
    }

    async fn apply(&self, context: &FlowContext, message: Message) -> ConnectorResult<Message> {
        let next_page_token = evaluate(&self.config.next_page_token, context, &message)?;
        let query = evaluate(&self.config.query, context, &message)?;

        let command = FileListCommand::new(
            self.config.drive_id.clone(),
            self.config.order_by.clone(),
            self.page_size,
            next_page_token,
            query,
        );
        let list = self.api.execute(&command).await?;

        let files = list
            .files
            .iter()
            .map(|f| JsonValue::Object(mapper::file_to_map(f)))
            .collect();
        let attributes = Attributes::new().with(keys::NEXT_PAGE_TOKEN, list.next_page_token);

        Ok(MessageBuilder::get(self.name())
            .with_json(JsonValue::Array(files))
            .attributes(attributes)
            .build())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileReadConfig {
    /// Taken from the payload when blank
    #[serde(default)]
    pub file_id: DynamicValue,
    /// Mime type of the returned content
    #[serde(default)]
    pub mime_type: Option<String>,
}

pub type FileDownloadConfig = FileReadConfig;

pub struct FileRead {
    config: FileReadConfig,
    mime_type: MimeType,
    api: DriveApi,
}

impl FileRead {
    pub fn new(configuration: DriveConfiguration, config: FileReadConfig) -> ConnectorResult<Self> {
        let operation = DriveOperation::FileRead;
        validate_scripts(operation, &[("fileId", &config.file_id)])?;
        let mime_type = MimeType::parse(config.mime_type.as_deref(), MimeType::APPLICATION_BINARY);
        let api = DriveApiFactory::create(operation.as_str(), &configuration)?;
        Ok(Self {
            config,
            mime_type,
            api,
        })
    }
}

#[async_trait]
impl Processor for FileRead {
    fn name(&self) -> &'static str {
        DriveOperation::FileRead.as_str()
    }

    async fn apply(&self, context: &FlowContext, message: Message) -> ConnectorResult<Message> {
        let operation = DriveOperation::FileRead;
        let file_id = identifier(operation, "File ID", &self.config.file_id, context, &message)?;
        let command = FileReadCommand::new(file_id.clone())?;
        let content = self.api.execute(&command).await?;

        Ok(MessageBuilder::get(self.name())
            .with_binary(content, self.mime_type.clone())
            .attributes(Attributes::new().with(keys::FILE_ID, Some(file_id)))
            .build())
    }
}

pub struct FileDownload {
    config: FileDownloadConfig,
    mime_type: MimeType,
    api: DriveApi,
}

impl FileDownload {
    pub fn new(
        configuration: DriveConfiguration,
        config: FileDownloadConfig,
    ) -> ConnectorResult<Self> {
        let operation = DriveOperation::FileDownload;
        validate_scripts(operation, &[("fileId", &config.file_id)])?;
        let mime_type = MimeType::parse(config.mime_type.as_deref(), MimeType::APPLICATION_BINARY);
        let api = DriveApiFactory::create(operation.as_str(), &configuration)?;
        Ok(Self {
            config,
            mime_type,
            api,
        })
    }
}

#[async_trait]
impl Processor for FileDownload {
    fn name(&self) -> &'static str {
        DriveOperation::FileDownload.as_str()
    }

    async fn apply(&self, context: &FlowContext, message: Message) -> ConnectorResult<Message> {
        let operation = DriveOperation::FileDownload;
        let file_id = identifier(operation, "File ID", &self.config.file_id, context, &message)?;
        let command = FileDownloadCommand::new(file_id.clone())?;
        let content = self.api.execute(&command).await?;

        Ok(MessageBuilder::get(self.name())
            .with_binary(content, self.mime_type.clone())
            .attributes(Attributes::new().with(keys::ID, Some(file_id)))
            .build())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileUpdateConfig {
    #[serde(default)]
    pub file_id: DynamicValue,
    /// Content type of the new content, the inbound message's when unset
    #[serde(default)]
    pub mime_type: Option<String>,
}

pub struct FileUpdate {
    config: FileUpdateConfig,
    api: DriveApi,
}

impl FileUpdate {
    pub fn new(
        configuration: DriveConfiguration,
        config: FileUpdateConfig,
    ) -> ConnectorResult<Self> {
        let operation = DriveOperation::FileUpdate;
        require_configured(operation, "File ID", &config.file_id)?;
        validate_scripts(operation, &[("fileId", &config.file_id)])?;
        let api = DriveApiFactory::create(operation.as_str(), &configuration)?;
        Ok(Self { config, api })
    }
}

#[async_trait]
impl Processor for FileUpdate {
    fn name(&self) -> &'static str {
        DriveOperation::FileUpdate.as_str()
    }

    async fn apply(&self, context: &FlowContext, message: Message) -> ConnectorResult<Message> {
        let operation = DriveOperation::FileUpdate;
        let file_id =
            evaluate_required(operation, "File ID", &self.config.file_id, context, &message)?;
        let mime_type = MimeType::parse(
            self.config.mime_type.as_deref(),
            message.mime_type().as_str(),
        );
        let content = converter::to_bytes(message.payload())?;

        let command = FileUpdateCommand::new(file_id, mime_type.as_str(), content)?;
        let file = self.api.execute(&command).await?;

        Ok(id_message(
            operation,
            file.id.clone(),
            Attributes::new().with(keys::ID, file.id),
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileUpdateMetadataConfig {
    #[serde(default)]
    pub file_id: DynamicValue,
    #[serde(default)]
    pub file_name: DynamicValue,
    #[serde(default)]
    pub file_description: DynamicValue,
}

pub struct FileUpdateMetadata {
    config: FileUpdateMetadataConfig,
    api: DriveApi,
}

impl FileUpdateMetadata {
    pub fn new(
        configuration: DriveConfiguration,
        config: FileUpdateMetadataConfig,
    ) -> ConnectorResult<Self> {
        let operation = DriveOperation::FileUpdateMetadata;
        require_configured(operation, "File ID", &config.file_id)?;
        validate_scripts(
            operation,
            &[
                ("fileId", &config.file_id),
                ("fileName", &config.file_name),
                ("fileDescription", &config.file_description),
            ],
        )?;
        let api = DriveApiFactory::create(operation.as_str(), &configuration)?;
        Ok(Self { config, api })
    }
}

#[async_trait]
impl Processor for FileUpdateMetadata {
    fn name(&self) -> &'static str {
        DriveOperation::FileUpdateMetadata.as_str()
    }

    async fn apply(&self, context: &FlowContext, message: Message) -> ConnectorResult<Message> {
        let operation = DriveOperation::FileUpdateMetadata;
        let file_id =
            evaluate_required(operation, "File ID", &self.config.file_id, context, &message)?;
        let file_name = evaluate(&self.config.file_name, context, &message)?;
        let file_description = evaluate(&self.config.file_description, context, &message)?;

        let command = FileUpdateMetadataCommand::new(file_id, file_name, file_description)?;
        let file = self.api.execute(&command).await?;

        Ok(id_message(
            operation,
            file.id.clone(),
            mapper::file_attributes(&file, UPDATED_METADATA_ATTRIBUTES),
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileDeleteConfig {
    /// Taken from the payload when blank
    #[serde(default)]
    pub file_id: DynamicValue,
}

pub struct FileDelete {
    config: FileDeleteConfig,
    api: DriveApi,
}

impl FileDelete {
    pub fn new(
        configuration: DriveConfiguration,
        config: FileDeleteConfig,
    ) -> ConnectorResult<Self> {
        let operation = DriveOperation::FileDelete;
        validate_scripts(operation, &[("fileId", &config.file_id)])?;
        let api = DriveApiFactory::create(operation.as_str(), &configuration)?;
        Ok(Self { config, api })
    }
}

#[async_trait]
impl Processor for FileDelete {
    fn name(&self) -> &'static str {
        DriveOperation::FileDelete.as_str()
    }

    async fn apply(&self, context: &FlowContext, message: Message) -> ConnectorResult<Message> {
        let operation = DriveOperation::FileDelete;
        let file_id = identifier(operation, "File ID", &self.config.file_id, context, &message)?;
        let command = FileDeleteCommand::new(file_id.clone())?;
        self.api.execute(&command).await?;

        Ok(id_message(
            operation,
            Some(file_id.clone()),
            Attributes::new().with(keys::ID, Some(file_id)),
        ))
    }
}
