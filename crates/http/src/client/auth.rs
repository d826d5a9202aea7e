//! Authentication endpoints

use super::{ClientError, PublicClient, SessionClient};
use inkpost_core::{
    LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest, Role,
    UserProfile,
};
use reqwest::Method;
use serde_json::Value as JsonValue;
use tracing::{info, warn};

pub const LOGIN_PATH: &str = "/api/login";
pub const ADMIN_LOGIN_PATH: &str = "/api/admin/login";
pub const REGISTER_PATH: &str = "/api/register";
pub const ADMIN_REGISTER_PATH: &str = "/api/admin/register";
pub const REFRESH_PATH: &str = "/api/refresh-token";
pub const PROTECTED_PATH: &str = "/api/protected";

/// Authentication endpoints for the public client
impl PublicClient {
    /// Exchange email and password for a credential pair
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        self.login_at(LOGIN_PATH, email, password).await
    }

    /// Same as [`login`](Self::login) against the admin endpoint
    pub async fn admin_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        self.login_at(ADMIN_LOGIN_PATH, email, password).await
    }

    async fn login_at(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let req = self.request(Method::POST, path).json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        });
        self.execute(req).await
    }

    /// Create an author account
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<JsonValue, ClientError> {
        let req = self.request(Method::POST, REGISTER_PATH).json(&RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: None,
        });
        self.execute_value(req).await
    }

    /// Create an administrator account
    pub async fn admin_register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<JsonValue, ClientError> {
        let req = self.request(Method::POST, ADMIN_REGISTER_PATH).json(&RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: Some(Role::Admin),
        });
        self.execute_value(req).await
    }

    /// Trade a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ClientError> {
        let req = self.request(Method::POST, REFRESH_PATH).json(&RefreshRequest {
            refresh_token: refresh_token.to_string(),
        });
        let response: RefreshResponse = self.execute(req).await?;
        if response.token.is_empty() {
            return Err(ClientError::request_failed(None, "Refresh returned no token"));
        }
        Ok(response.token)
    }
}

/// Session lifecycle on the authenticated client
impl SessionClient {
    /// Log in as an author and persist the session
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let response = self.public().login(email, password).await?;
        self.establish(response).await
    }

    /// Log in as an administrator
    ///
    /// The server's answer is double-checked against the protected profile; a
    /// non-admin account is logged straight back out.
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let response = self.public().admin_login(email, password).await?;
        self.establish(response).await?;

        let profile = self.current_user().await?;
        if !profile.is_admin() {
            warn!(user = %profile.id, "Admin login rejected for non-admin account");
            self.store().clear().await?;
            return Err(ClientError::request_failed(None, "Admin access required"));
        }
        Ok(profile)
    }

    async fn establish(&self, response: LoginResponse) -> Result<UserProfile, ClientError> {
        self.store().save_credentials(&response.credentials).await?;

        let profile = match response.user {
            Some(user) => {
                self.store().save_profile(&user).await?;
                user
            }
            None => self.current_user().await?,
        };
        info!(user = %profile.id, role = %profile.role, "Logged in");
        Ok(profile)
    }

    /// Fetch the profile behind the current token and cache it
    pub async fn current_user(&self) -> Result<UserProfile, ClientError> {
        let profile: UserProfile = self.get_as(PROTECTED_PATH).await?;
        self.store().save_profile(&profile).await?;
        Ok(profile)
    }

    /// Profile cached at login, without a network call
    pub async fn cached_user(&self) -> Result<Option<UserProfile>, ClientError> {
        Ok(self.store().profile().await?)
    }

    /// Forget the session locally
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.store().clear().await?;
        info!("Logged out");
        Ok(())
    }
}
