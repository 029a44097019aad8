use super::{
    evaluate, evaluate_required, id_message, identifier, require_configured, validate_scripts,
    Processor,
};
use crate::command::{
    DriveApi, DriveApiFactory, PermissionCreateCommand, PermissionDeleteCommand,
    PermissionListCommand, PermissionUpdateCommand, DOMAIN_REQUIRED, EMAIL_REQUIRED,
};
use crate::config::DriveConfiguration;
use crate::error::{ConnectorError, ConnectorResult, DriveOperation};
use crate::mapper::{self, keys, PERMISSION_CREATE_ATTRIBUTES, PERMISSION_UPDATE_ATTRIBUTES};
use crate::model::{PermissionRole, PermissionType};
use async_trait::async_trait;
use gdrive_core::{Attributes, DynamicValue, FlowContext, Message, MessageBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PermissionCreateConfig {
    /// Taken from the payload when blank
    #[serde(default)]
    pub file_id: DynamicValue,
    #[serde(default)]
    pub role: PermissionRole,
    #[serde(default, rename = "type")]
    pub permission_type: PermissionType,
    #[serde(default)]
    pub email_address: DynamicValue,
    #[serde(default)]
    pub domain: DynamicValue,
    #[serde(default)]
    pub send_notification_email: bool,
}

pub struct PermissionCreate {
    config: PermissionCreateConfig,
    api: DriveApi,
}

impl PermissionCreate {
    pub fn new(
        configuration: DriveConfiguration,
        config: PermissionCreateConfig,
    ) -> ConnectorResult<Self> {
        let operation = DriveOperation::PermissionCreate;
        if config.permission_type.requires_email() && config.email_address.is_null_or_blank() {
            return Err(ConnectorError::config(operation, EMAIL_REQUIRED));
        }
        if config.permission_type.requires_domain() && config.domain.is_null_or_blank() {
            return Err(ConnectorError::config(operation, DOMAIN_REQUIRED));
        }
        validate_scripts(
            operation,
            &[
                ("fileId", &config.file_id),
                ("emailAddress", &config.email_address),
                ("domain", &config.domain),
            ],
        )?;
        let api = DriveApiFactory::create(operation.as_str(), &configuration)?;
        Ok(Self { config, api })
    }
}

#[async_trait]
impl Processor for PermissionCreate {
    fn name(&self) -> &'static str {
        DriveOperation::PermissionCreate.as_str()
    }

    async fn apply(&self, context: &FlowContext, message: Message) -> ConnectorResult<Message> {
        let operation = DriveOperation::PermissionCreate;
        let file_id = identifier(operation, "File ID", &self.config.file_id, context, &message)?;
        let email_address = evaluate(&self.config.email_address, context, &message)?;
        let domain = evaluate(&self.config.domain, context, &message)?;

        let command = PermissionCreateCommand::new(
            file_id.clone(),
            self.config.role,
            self.config.permission_type,
            email_address,
            domain,
            self.config.send_notification_email,
        )?;
        let permission = self.api.execute(&command).await?;

        let attributes = mapper::permission_attributes(&permission, PERMISSION_CREATE_ATTRIBUTES)
            .with(keys::FILE_ID, Some(file_id));
        Ok(id_message(operation, permission.id, attributes))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PermissionListConfig {
    #[serde(default)]
    pub file_id: DynamicValue,
}

pub struct PermissionList {
    config: PermissionListConfig,
    api: DriveApi,
}

impl PermissionList {
    pub fn new(
        configuration: DriveConfiguration,
        config: PermissionListConfig,
    ) -> ConnectorResult<Self> {
        let operation = DriveOperation::PermissionList;
        validate_scripts(operation, &[("fileId", &config.file_id)])?;
        let api = DriveApiFactory::create(operation.as_str(), &configuration)?;
        Ok(Self { config, api })
    }
}

#[async_trait]
impl Processor for PermissionList {
    fn name(&self) -> &'static str {
        DriveOperation::PermissionList.as_str()
    }

    async fn apply(&self, context: &FlowContext, message: Message) -> ConnectorResult<Message> {
        let operation = DriveOperation::PermissionList;
        let file_id = identifier(operation, "File ID", &self.config.file_id, context, &message)?;
        let command = PermissionListCommand::new(file_id.clone())?;
        let permissions = self.api.execute(&command).await?;

        let listed = permissions.iter().map(mapper::listed_permission).collect();
        Ok(MessageBuilder::get(self.name())
            .with_json(JsonValue::Array(listed))
            .attributes(Attributes::new().with(keys::FILE_ID, Some(file_id)))
            .build())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PermissionUpdateConfig {
    #[serde(default)]
    pub file_id: DynamicValue,
    #[serde(default)]
    pub permission_id: DynamicValue,
    #[serde(default)]
    pub role: PermissionRole,
}

pub struct PermissionUpdate {
    config: PermissionUpdateConfig,
    api: DriveApi,
}

impl PermissionUpdate {
    pub fn new(
        configuration: DriveConfiguration,
        config: PermissionUpdateConfig,
    ) -> ConnectorResult<Self> {
        let operation = DriveOperation::PermissionUpdate;
        validate_scripts(
            operation,
            &[
                ("fileId", &config.file_id),
                ("permissionId", &config.permission_id),
            ],
        )?;
        let api = DriveApiFactory::create(operation.as_str(), &configuration)?;
        Ok(Self { config, api })
    }
}

#[async_trait]
impl Processor for PermissionUpdate {
    fn name(&self) -> &'static str {
        DriveOperation::PermissionUpdate.as_str()
    }

    async fn apply(&self, context: &FlowContext, message: Message) -> ConnectorResult<Message> {
        let operation = DriveOperation::PermissionUpdate;
        let file_id = identifier(operation, "File ID", &self.config.file_id, context, &message)?;
        let permission_id = identifier(
            operation,
            "Permission ID",
            &self.config.permission_id,
            context,
            &message,
        )?;

        let command =
            PermissionUpdateCommand::new(file_id.clone(), permission_id, self.config.role)?;
        let permission = self.api.execute(&command).await?;

        let attributes = mapper::permission_attributes(&permission, PERMISSION_UPDATE_ATTRIBUTES)
            .with(keys::FILE_ID, Some(file_id));
        Ok(id_message(operation, permission.id, attributes))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PermissionDeleteConfig {
    #[serde(default)]
    pub file_id: DynamicValue,
    /// Taken from the payload when blank
    #[serde(default)]
    pub permission_id: DynamicValue,
}

pub struct PermissionDelete {
    config: PermissionDeleteConfig,
    api: DriveApi,
}

impl PermissionDelete {
    pub fn new(
        configuration: DriveConfiguration,
        config: PermissionDeleteConfig,
    ) -> ConnectorResult<Self> {
        let operation = DriveOperation::PermissionDelete;
        require_configured(operation, "File ID", &config.file_id)?;
        validate_scripts(
            operation,
            &[
                ("fileId", &config.file_id),
                ("permissionId", &config.permission_id),
            ],
        )?;
        let api = DriveApiFactory::create(operation.as_str(), &configuration)?;
        Ok(Self { config, api })
    }
}

#[async_trait]
impl Processor for PermissionDelete {
    fn name(&self) -> &'static str {
        DriveOperation::PermissionDelete.as_str()
    }

    async fn apply(&self, context: &FlowContext, message: Message) -> ConnectorResult<Message> {
        let operation = DriveOperation::PermissionDelete;
        let file_id =
            evaluate_required(operation, "File ID", &self.config.file_id, context, &message)?;
        let permission_id = identifier(
            operation,
            "Permission ID",
            &self.config.permission_id,
            context,
            &message,
        )?;

        let command = PermissionDeleteCommand::new(file_id.clone(), permission_id.clone())?;
        self.api.execute(&command).await?;

        let attributes = Attributes::new()
            .with(keys::ID, Some(permission_id.clone()))
            .with(keys::FILE_ID, Some(file_id));
        Ok(id_message(operation, Some(permission_id), attributes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn configuration() -> DriveConfiguration {
        DriveConfiguration::with_access_token("token")
    }

    #[test]
    fn create_config_uses_drive_names() {
        let config: PermissionCreateConfig = serde_json::from_value(json!({
            "fileId": "#[message.payload()]",
            "role": "fileOrganizer",
            "type": "domain",
            "domain": "example.com"
        }))
        .unwrap();
        assert_eq!(config.role, PermissionRole::FileOrganizer);
        assert_eq!(config.permission_type, PermissionType::Domain);
        assert!(!config.send_notification_email);
    }

    #[test]
    fn create_requires_email_for_people() {
        let config = PermissionCreateConfig {
            email_address: DynamicValue::from(""),
            ..PermissionCreateConfig::default()
        };
        let err = PermissionCreate::new(configuration(), config).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: PermissionCreate has a configuration error: \
             Email Address must not be empty when permission type is user or group."
        );
    }

    #[test]
    fn create_requires_domain_for_domain() {
        let config = PermissionCreateConfig {
            permission_type: PermissionType::Domain,
            email_address: DynamicValue::from("my@email.com"),
            ..PermissionCreateConfig::default()
        };
        let err = PermissionCreate::new(configuration(), config).err().unwrap();
        assert!(err
            .to_string()
            .ends_with("Domain must not be empty when permission type is domain."));
    }

    #[test]
    fn anyone_needs_neither() {
        let config = PermissionCreateConfig {
            permission_type: PermissionType::Anyone,
            ..PermissionCreateConfig::default()
        };
        assert!(PermissionCreate::new(configuration(), config).is_ok());
    }

    #[test]
    fn delete_requires_file_id() {
        assert!(PermissionDelete::new(configuration(), PermissionDeleteConfig::default()).is_err());
    }
}
