//! Customer user resources, directory roles, and operations.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::PartnerCenterClient;
use crate::error::PartnerResult;
use crate::paging::ResourceCollection;

/// Lifecycle state of a customer user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserState {
    Active,
    Inactive,
    Deleted,
}

/// Initial password settings for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordProfile {
    pub password: String,
    pub force_change_password: bool,
}

/// A user within a customer tenant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub usage_location: Option<String>,
    #[serde(default)]
    pub state: Option<UserState>,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

/// Request body for creating a customer user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub user_principal_name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub display_name: String,
    pub password_profile: PasswordProfile,
    #[serde(default)]
    pub usage_location: Option<String>,
}

/// Request body for resetting a user's password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPasswordRequest {
    pub password_profile: PasswordProfile,
}

/// An Azure AD directory role within the customer tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRole {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

impl PartnerCenterClient {
    /// Creates a user in the customer tenant.
    #[instrument(skip(self, request))]
    pub async fn create_user(
        &self,
        customer_id: &str,
        request: &CreateUserRequest,
    ) -> PartnerResult<CustomerUser> {
        let url = self.build_url(&["customers", customer_id, "users"])?;
        self.post(&url, request).await
    }

    /// Fetches a customer user by id.
    #[instrument(skip(self))]
    pub async fn get_user(
        &self,
        customer_id: &str,
        user_id: &str,
    ) -> PartnerResult<CustomerUser> {
        let url = self.build_url(&["customers", customer_id, "users", user_id])?;
        self.get(&url).await
    }

    /// Deletes a customer user.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, customer_id: &str, user_id: &str) -> PartnerResult<()> {
        let url = self.build_url(&["customers", customer_id, "users", user_id])?;
        self.delete(&url).await
    }

    /// Resets a user's password.
    ///
    /// The service accepts the reset as a POST against the user resource.
    #[instrument(skip(self, request))]
    pub async fn update_user_password(
        &self,
        customer_id: &str,
        user_id: &str,
        request: &UpdateUserPasswordRequest,
    ) -> PartnerResult<CustomerUser> {
        let url = self.build_url(&["customers", customer_id, "users", user_id])?;
        self.post(&url, request).await
    }

    /// Lists the directory roles assigned to a user.
    #[instrument(skip(self))]
    pub async fn list_user_roles(
        &self,
        customer_id: &str,
        user_id: &str,
    ) -> PartnerResult<ResourceCollection<DirectoryRole>> {
        let url = self.build_url(&[
            "customers",
            customer_id,
            "users",
            user_id,
            "directoryroles",
        ])?;
        self.get(&url).await
    }

    /// Lists all directory roles in the customer tenant.
    #[instrument(skip(self))]
    pub async fn list_directory_roles(
        &self,
        customer_id: &str,
    ) -> PartnerResult<ResourceCollection<DirectoryRole>> {
        let url = self.build_url(&["customers", customer_id, "users", "directoryroles"])?;
        self.get(&url).await
    }
}
