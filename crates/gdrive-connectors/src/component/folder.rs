use super::{evaluate, id_message, identifier, validate_scripts, Processor};
use crate::command::{DriveApi, DriveApiFactory, FolderCreateCommand};
use crate::config::DriveConfiguration;
use crate::error::{ConnectorResult, DriveOperation};
use crate::mapper::{self, CREATED_FILE_ATTRIBUTES};
use async_trait::async_trait;
use gdrive_core::{DynamicValue, FlowContext, Message};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FolderCreateConfig {
    /// Taken from the payload when blank
    #[serde(default)]
    pub folder_name: DynamicValue,
    #[serde(default)]
    pub folder_description: DynamicValue,
    #[serde(default)]
    pub parent_folder_id: DynamicValue,
}

pub struct FolderCreate {
    config: FolderCreateConfig,
    api: DriveApi,
}

impl FolderCreate {
    pub fn new(
        configuration: DriveConfiguration,
        config: FolderCreateConfig,
    ) -> ConnectorResult<Self> {
        let operation = DriveOperation::FolderCreate;
        validate_scripts(
            operation,
            &[
                ("folderName", &config.folder_name),
                ("folderDescription", &config.folder_description),
                ("parentFolderId", &config.parent_folder_id),
            ],
        )?;
        let api = DriveApiFactory::create(operation.as_str(), &configuration)?;
        Ok(Self { config, api })
    }
}

#[async_trait]
impl Processor for FolderCreate {
    fn name(&self) -> &'static str {
        DriveOperation::FolderCreate.as_str()
    }

    async fn apply(&self, context: &FlowContext, message: Message) -> ConnectorResult<Message> {
        let operation = DriveOperation::FolderCreate;
        let folder_name = identifier(
            operation,
            "folder name",
            &self.config.folder_name,
            context,
            &message,
        )?;
        let folder_description = evaluate(&self.config.folder_description, context, &message)?;
        let parent_folder_id = evaluate(&self.config.parent_folder_id, context, &message)?;

        let command = FolderCreateCommand::new(folder_name, folder_description, parent_folder_id)?;
        let folder = self.api.execute(&command).await?;

        Ok(id_message(
            operation,
            folder.id.clone(),
            mapper::file_attributes(&folder, CREATED_FILE_ATTRIBUTES),
        ))
    }
}
