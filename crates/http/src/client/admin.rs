//! Admin panel: user and contact message management

use super::content::CONTACT_PATH;
use super::{ClientError, SessionClient, item_path};
use inkpost_core::{ContactDraft, ContactMessage, Id, UserProfile, UserUpdate};
use reqwest::Method;
use serde_json::Value as JsonValue;

pub const USERS_PATH: &str = "/api/users";

impl SessionClient {
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, ClientError> {
        self.get_as(USERS_PATH).await
    }

    pub async fn get_user(&self, id: &Id) -> Result<UserProfile, ClientError> {
        self.get_as(&item_path(USERS_PATH, id)).await
    }

    /// Patch name and email, and the password when one is given
    pub async fn update_user(&self, id: &Id, update: &UserUpdate) -> Result<JsonValue, ClientError> {
        self.send_as(Method::PATCH, &item_path(USERS_PATH, id), update)
            .await
    }

    pub async fn delete_user(&self, id: &Id) -> Result<(), ClientError> {
        self.send_unit(Method::DELETE, &item_path(USERS_PATH, id))
            .await
    }

    /// Contact form submissions
    pub async fn list_messages(&self) -> Result<Vec<ContactMessage>, ClientError> {
        self.get_as(CONTACT_PATH).await
    }

    pub async fn get_message(&self, id: &Id) -> Result<ContactMessage, ClientError> {
        self.get_as(&item_path(CONTACT_PATH, id)).await
    }

    pub async fn update_message(
        &self,
        id: &Id,
        draft: &ContactDraft,
    ) -> Result<JsonValue, ClientError> {
        self.send_as(Method::PATCH, &item_path(CONTACT_PATH, id), draft)
            .await
    }

    pub async fn delete_message(&self, id: &Id) -> Result<(), ClientError> {
        self.send_unit(Method::DELETE, &item_path(CONTACT_PATH, id))
            .await
    }
}
