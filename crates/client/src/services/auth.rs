//! Authentication and profile operations.

use covu_core::models::User;
use covu_core::validate::{ValidationError, validate_new_password};
use covu_core::{Email, PhoneNumber};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use super::CovuClient;
use crate::error::ApiError;
use crate::http::{ApiRequest, SessionEvent};

/// Body returned by login and registration.
#[derive(Deserialize)]
struct SessionResponse {
    access: String,
    refresh: String,
    user: User,
}

#[derive(Deserialize)]
struct BecomeSellerResponse {
    user: User,
}

/// Details for a new account.
#[derive(Clone)]
pub struct RegisterInput {
    pub full_name: String,
    pub email: Email,
    pub phone: PhoneNumber,
    /// State name, e.g. `Akwa Ibom`.
    pub state: String,
    /// Local Government Area; sent as the account's city.
    pub lga: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

impl std::fmt::Debug for RegisterInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterInput")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("state", &self.state)
            .field("lga", &self.lga)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl RegisterInput {
    /// Validate and build the registration payload.
    fn to_payload(&self) -> Result<Value, ValidationError> {
        validate_new_password(
            self.password.expose_secret(),
            self.confirm_password.expose_secret(),
        )?;

        Ok(json!({
            "full_name": self.full_name.trim(),
            "email": self.email.as_str().to_lowercase(),
            "phone_number": self.phone.local(),
            "state": state_slug(&self.state),
            "city": self.lga.trim(),
            "password": self.password.expose_secret(),
            "password_confirm": self.confirm_password.expose_secret(),
        }))
    }
}

/// Store details submitted when upgrading to a seller account.
#[derive(Debug, Clone, Default)]
pub struct BecomeSellerInput {
    pub store_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
}

/// `Akwa Ibom` -> `akwa_ibom`, `FCT - Abuja` -> `fct_abuja`.
fn state_slug(state: &str) -> String {
    state
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

impl CovuClient {
    /// Sign in and persist the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<User, ApiError> {
        let request = ApiRequest::post("/auth/login/")
            .json(json!({
                "email": email.as_str(),
                "password": password.expose_secret(),
            }))
            .without_refresh();

        let session: SessionResponse = self.api().send(request).await?;
        let user = self.store_session(session)?;
        info!(user_id = %user.id, "Logged in");
        Ok(user)
    }

    /// Create an account and persist the new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is invalid or the backend rejects it.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: &RegisterInput) -> Result<User, ApiError> {
        let request = ApiRequest::post("/auth/register/")
            .json(input.to_payload()?)
            .without_refresh();

        let session: SessionResponse = self.api().send(request).await?;
        let user = self.store_session(session)?;
        info!(user_id = %user.id, "Registered");
        Ok(user)
    }

    /// Forget the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage cannot be written.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.tokens().clear()?;
        self.api().emit(SessionEvent::SignedOut);
        info!("Logged out");
        Ok(())
    }

    /// Whether an access token is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage cannot be read.
    pub fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(self.tokens().is_authenticated()?)
    }

    /// The profile cached at the last login or profile fetch.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage cannot be read.
    pub fn current_user(&self) -> Result<Option<User>, ApiError> {
        Ok(self.tokens().current_user()?)
    }

    /// Fetch the profile and refresh the cached copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<User, ApiError> {
        let user: User = self.api().send(ApiRequest::get("/auth/profile/")).await?;
        self.tokens().set_current_user(&user)?;
        Ok(user)
    }

    /// Update profile fields and refresh the cached copy.
    ///
    /// `changes` is a JSON object of the fields to change.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, changes))]
    pub async fn update_profile(&self, changes: Value) -> Result<User, ApiError> {
        let user: User = self
            .api()
            .send(ApiRequest::patch("/auth/profile/").json(changes))
            .await?;
        self.tokens().set_current_user(&user)?;
        Ok(user)
    }

    /// Change the account password.
    ///
    /// # Errors
    ///
    /// Returns an error if the new password is weak or the old one is wrong.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        old_password: &SecretString,
        new_password: &SecretString,
        confirm_password: &SecretString,
    ) -> Result<(), ApiError> {
        validate_new_password(new_password.expose_secret(), confirm_password.expose_secret())?;

        let request = ApiRequest::post("/auth/change-password/").json(json!({
            "old_password": old_password.expose_secret(),
            "new_password": new_password.expose_secret(),
        }));
        self.api().send_empty(request).await
    }

    /// Upgrade the account to a seller with a first store.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the request.
    #[instrument(skip(self, input), fields(store_name = %input.store_name))]
    pub async fn become_seller(&self, input: &BecomeSellerInput) -> Result<User, ApiError> {
        let mut body = json!({ "store_name": input.store_name.trim() });
        if let Some(map) = body.as_object_mut() {
            for (key, value) in [
                ("description", &input.description),
                ("category", &input.category),
                ("city", &input.city),
            ] {
                if let Some(value) = value {
                    map.insert(key.to_owned(), Value::String(value.clone()));
                }
            }
        }

        let response: BecomeSellerResponse = self
            .api()
            .send(ApiRequest::post("/auth/become-seller/").json(body))
            .await?;
        self.tokens().set_current_user(&response.user)?;
        info!(user_id = %response.user.id, "Upgraded to seller");
        Ok(response.user)
    }

    fn store_session(&self, session: SessionResponse) -> Result<User, ApiError> {
        let tokens = self.tokens();
        tokens.set_tokens(
            &SecretString::from(session.access),
            &SecretString::from(session.refresh),
        )?;
        tokens.set_current_user(&session.user)?;
        self.api().emit(SessionEvent::SignedIn);
        Ok(session.user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(password: &str, confirm: &str) -> RegisterInput {
        RegisterInput {
            full_name: " Ada Obi ".to_owned(),
            email: Email::parse("Ada@Covu.NG").unwrap(),
            phone: PhoneNumber::parse("+2348031234567").unwrap(),
            state: "Akwa Ibom".to_owned(),
            lga: "Uyo".to_owned(),
            password: SecretString::from(password),
            confirm_password: SecretString::from(confirm),
        }
    }

    #[test]
    fn test_state_slug() {
        assert_eq!(state_slug("Akwa Ibom"), "akwa_ibom");
        assert_eq!(state_slug("FCT - Abuja"), "fct_abuja");
        assert_eq!(state_slug("Lagos"), "lagos");
    }

    #[test]
    fn test_register_payload_normalizes_fields() {
        let payload = input("Sup3rSecret", "Sup3rSecret").to_payload().unwrap();
        assert_eq!(payload["full_name"], "Ada Obi");
        assert_eq!(payload["email"], "ada@covu.ng");
        assert_eq!(payload["phone_number"], "08031234567");
        assert_eq!(payload["state"], "akwa_ibom");
        assert_eq!(payload["city"], "Uyo");
        assert_eq!(payload["password_confirm"], "Sup3rSecret");
    }

    #[test]
    fn test_register_rejects_mismatched_passwords() {
        assert_eq!(
            input("Sup3rSecret", "other").to_payload().unwrap_err(),
            ValidationError::PasswordMismatch
        );
    }

    #[test]
    fn test_register_input_debug_redacts_password() {
        let debug_output = format!("{:?}", input("Sup3rSecret", "Sup3rSecret"));
        assert!(!debug_output.contains("Sup3rSecret"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
