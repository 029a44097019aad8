use super::{describe, failure, require_not_blank, show, Command};
use crate::client::{DriveClient, PermissionOptions};
use crate::error::{ClientError, ClientResult, ConnectorError, ConnectorResult, DriveOperation};
use crate::mapper::{
    fields_mask, permission_list_mask, PERMISSION_CREATE_ATTRIBUTES, PERMISSION_UPDATE_ATTRIBUTES,
};
use crate::model::{Permission, PermissionRequest, PermissionRole, PermissionType};
use async_trait::async_trait;

pub const EMAIL_REQUIRED: &str =
    "Email Address must not be empty when permission type is user or group.";
pub const DOMAIN_REQUIRED: &str = "Domain must not be empty when permission type is domain.";

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct PermissionCreateCommand {
    file_id: String,
    role: PermissionRole,
    permission_type: PermissionType,
    email_address: Option<String>,
    domain: Option<String>,
    send_notification_email: bool,
}

impl PermissionCreateCommand {
    pub fn new(
        file_id: impl Into<String>,
        role: PermissionRole,
        permission_type: PermissionType,
        email_address: Option<String>,
        domain: Option<String>,
        send_notification_email: bool,
    ) -> ConnectorResult<Self> {
        let operation = DriveOperation::PermissionCreate;
        let file_id = file_id.into();
        require_not_blank(operation, "File ID", &file_id)?;

        let email_address = non_blank(email_address);
        let domain = non_blank(domain);
        if permission_type.requires_email() && email_address.is_none() {
            return Err(ConnectorError::operation(operation, EMAIL_REQUIRED));
        }
        if permission_type.requires_domain() && domain.is_none() {
            return Err(ConnectorError::operation(operation, DOMAIN_REQUIRED));
        }

        Ok(Self {
            file_id,
            role,
            permission_type,
            email_address,
            domain,
            send_notification_email,
        })
    }

    fn request(&self) -> (PermissionRequest, PermissionOptions) {
        let body = PermissionRequest {
            role: Some(self.role),
            permission_type: Some(self.permission_type),
            email_address: self
                .email_address
                .clone()
                .filter(|_| self.permission_type.requires_email()),
            domain: self
                .domain
                .clone()
                .filter(|_| self.permission_type.requires_domain()),
        };
        let options = PermissionOptions {
            send_notification_email: self
                .permission_type
                .requires_email()
                .then_some(self.send_notification_email),
            transfer_ownership: self.role.transfers_ownership(),
            fields: fields_mask(PERMISSION_CREATE_ATTRIBUTES),
        };
        (body, options)
    }
}

#[async_trait]
impl Command for PermissionCreateCommand {
    type Output = Permission;

    fn operation(&self) -> DriveOperation {
        DriveOperation::PermissionCreate
    }

    async fn execute(&self, client: &DriveClient) -> ClientResult<Permission> {
        let (body, options) = self.request();
        client.create_permission(&self.file_id, &body, &options).await
    }

    fn on_error(&self, error: ClientError) -> ConnectorError {
        let message = describe(
            "create permission on Google Drive",
            &[
                ("fileId", self.file_id.clone()),
                ("role", self.role.to_string()),
                ("type", self.permission_type.to_string()),
                ("emailAddress", show(&self.email_address)),
                ("domain", show(&self.domain)),
            ],
            &error.cause(),
        );
        failure(self.operation(), &error, message)
    }
}

#[derive(Debug, Clone)]
pub struct PermissionListCommand {
    file_id: String,
}

impl PermissionListCommand {
    pub fn new(file_id: impl Into<String>) -> ConnectorResult<Self> {
        let file_id = file_id.into();
        require_not_blank(DriveOperation::PermissionList, "File ID", &file_id)?;
        Ok(Self { file_id })
    }
}

#[async_trait]
impl Command for PermissionListCommand {
    type Output = Vec<Permission>;

    fn operation(&self) -> DriveOperation {
        DriveOperation::PermissionList
    }

    async fn execute(&self, client: &DriveClient) -> ClientResult<Vec<Permission>> {
        let list = client
            .list_permissions(&self.file_id, &permission_list_mask())
            .await?;
        Ok(list.permissions)
    }

    fn on_error(&self, error: ClientError) -> ConnectorError {
        let message = describe(
            "list permissions from Google Drive",
            &[("fileId", self.file_id.clone())],
            &error.cause(),
        );
        failure(self.operation(), &error, message)
    }
}

#[derive(Debug, Clone)]
pub struct PermissionUpdateCommand {
    file_id: String,
    permission_id: String,
    role: PermissionRole,
}

impl PermissionUpdateCommand {
    pub fn new(
        file_id: impl Into<String>,
        permission_id: impl Into<String>,
        role: PermissionRole,
    ) -> ConnectorResult<Self> {
        let operation = DriveOperation::PermissionUpdate;
        let file_id = file_id.into();
        let permission_id = permission_id.into();
        require_not_blank(operation, "File ID", &file_id)?;
        require_not_blank(operation, "Permission ID", &permission_id)?;
        Ok(Self {
            file_id,
            permission_id,
            role,
        })
    }
}

#[async_trait]
impl Command for PermissionUpdateCommand {
    type Output = Permission;

    fn operation(&self) -> DriveOperation {
        DriveOperation::PermissionUpdate
    }

    async fn execute(&self, client: &DriveClient) -> ClientResult<Permission> {
        // Drive only accepts the role on update
        let body = PermissionRequest {
            role: Some(self.role),
            ..PermissionRequest::default()
        };
        client
            .update_permission(
                &self.file_id,
                &self.permission_id,
                &body,
                self.role.transfers_ownership(),
                &fields_mask(PERMISSION_UPDATE_ATTRIBUTES),
            )
            .await
    }

    fn on_error(&self, error: ClientError) -> ConnectorError {
        let message = describe(
            "update permission on Google Drive",
            &[
                ("fileId", self.file_id.clone()),
                ("permissionId", self.permission_id.clone()),
                ("role", self.role.to_string()),
            ],
            &error.cause(),
        );
        failure(self.operation(), &error, message)
    }
}

#[derive(Debug, Clone)]
pub struct PermissionDeleteCommand {
    file_id: String,
    permission_id: String,
}

impl PermissionDeleteCommand {
    pub fn new(
        file_id: impl Into<String>,
        permission_id: impl Into<String>,
    ) -> ConnectorResult<Self> {
        let operation = DriveOperation::PermissionDelete;
        let file_id = file_id.into();
        let permission_id = permission_id.into();
        require_not_blank(operation, "Permission ID", &permission_id)?;
        require_not_blank(operation, "File ID", &file_id)?;
        Ok(Self {
            file_id,
            permission_id,
        })
    }
}

#[async_trait]
impl Command for PermissionDeleteCommand {
    type Output = ();

    fn operation(&self) -> DriveOperation {
        DriveOperation::PermissionDelete
    }

    async fn execute(&self, client: &DriveClient) -> ClientResult<()> {
        client
            .delete_permission(&self.file_id, &self.permission_id)
            .await
    }

    fn on_error(&self, error: ClientError) -> ConnectorError {
        let message = describe(
            "delete permission from Google Drive",
            &[
                ("permissionId", self.permission_id.clone()),
                ("fileId", self.file_id.clone()),
            ],
            &error.cause(),
        );
        failure(self.operation(), &error, message)
    }
}
