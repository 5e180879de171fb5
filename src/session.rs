//! Session management
//!
//! A [`Session`] is the identity established by login or signup. It is
//! persisted field-by-field in the key-value store so that it survives
//! restarts, and rebuilt by [`SessionManager::current`]. There is at most
//! one session per store; establishing a new one replaces the old one.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::AuthResponse;
use crate::error::{DermascanError, Result};
use crate::storage::{keys, KeyValueStore};

/// Role of the logged-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Uploads images and books doctors
    Patient,
    /// Reviews diagnoses and confirms appointments
    Doctor,
    /// Approves doctors
    Admin,
}

impl Role {
    /// Wire and storage name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Admin => "admin",
        }
    }

    /// Store key holding this role's bearer token.
    pub fn token_key(&self) -> &'static str {
        match self {
            Self::Doctor => keys::DOCTOR_TOKEN,
            Self::Patient | Self::Admin => keys::TOKEN,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DermascanError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "patient" => Ok(Self::Patient),
            "doctor" => Ok(Self::Doctor),
            "admin" => Ok(Self::Admin),
            other => Err(DermascanError::Validation(format!(
                "Unknown role: {}",
                other
            ))),
        }
    }
}

/// Identity of the logged-in user
///
/// Passed by reference to every authenticated API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token
    pub auth_token: String,
    /// Role, fixed for the life of the session
    pub role: Role,
    /// Account id
    pub user_id: String,
    /// Name shown in greetings
    pub display_name: String,
    /// Doctor approval flag; always false for other roles
    pub approval_status: bool,
    /// Login email, when known
    pub email: Option<String>,
    /// Patient profile id, distinct from `user_id`
    pub patient_id: Option<String>,
}

impl Session {
    /// Builds a session from a login or signup response.
    ///
    /// `fallback_name` is used when the response carries no display name
    /// (signup responses echo only ids).
    pub fn from_auth(response: &AuthResponse, fallback_name: Option<&str>) -> Self {
        let user = &response.user;
        Self {
            auth_token: response.token.clone(),
            role: user.role,
            user_id: user.id.to_string(),
            display_name: user
                .full_name
                .clone()
                .or_else(|| fallback_name.map(str::to_string))
                .unwrap_or_default(),
            approval_status: user.is_approved.unwrap_or(false),
            email: user.email.clone(),
            patient_id: user.patient_user_id.clone().filter(|id| !id.is_empty()),
        }
    }

    /// Whether this is a doctor awaiting admin approval.
    pub fn is_pending_doctor(&self) -> bool {
        self.role == Role::Doctor && !self.approval_status
    }
}

/// Reads and writes the session in the key-value store
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
}

impl SessionManager {
    /// Creates a manager over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persists `session`, replacing any previous one.
    ///
    /// Old session keys are removed first, so an interrupted call leaves no
    /// session rather than a mix of two.
    ///
    /// # Errors
    ///
    /// Returns `DermascanError::Validation` for an empty token and
    /// `DermascanError::Storage` when the store rejects the write.
    pub async fn establish(&self, session: &Session) -> Result<()> {
        if session.auth_token.trim().is_empty() {
            return Err(DermascanError::Validation("Auth token is empty".to_string()).into());
        }

        self.store.remove_many(keys::SESSION_KEYS).await?;

        let mut entries = vec![
            (keys::ROLE.to_string(), session.role.as_str().to_string()),
            (keys::USER_ID.to_string(), session.user_id.clone()),
            (keys::FULL_NAME.to_string(), session.display_name.clone()),
            (
                keys::IS_APPROVED.to_string(),
                session.approval_status.to_string(),
            ),
            (
                keys::PATIENT_ID.to_string(),
                session.patient_id.clone().unwrap_or_default(),
            ),
        ];
        if let Some(email) = &session.email {
            entries.push((keys::EMAIL.to_string(), email.clone()));
        }
        if session.role == Role::Doctor {
            entries.push((keys::DOCTOR_ID.to_string(), session.user_id.clone()));
        }
        // Token last: a session is only visible once every field is written.
        entries.push((
            session.role.token_key().to_string(),
            session.auth_token.clone(),
        ));

        self.store.set_many(&entries).await?;
        tracing::info!(user_id = %session.user_id, role = %session.role, "Session established");
        Ok(())
    }

    /// Rebuilds the current session, or `None` when unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns `DermascanError::Storage` if the stored role is not a known
    /// role.
    pub async fn current(&self) -> Result<Option<Session>> {
        let role = match self.store.get(keys::ROLE).await? {
            Some(raw) => raw.parse::<Role>().map_err(|_| {
                DermascanError::Storage(format!("Stored role is invalid: {}", raw))
            })?,
            None => return Ok(None),
        };

        let auth_token = match self.store.get(role.token_key()).await? {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(None),
        };

        let user_id = self.store.get(keys::USER_ID).await?.unwrap_or_default();
        let display_name = self.store.get(keys::FULL_NAME).await?.unwrap_or_default();
        let approval_status = self
            .store
            .get(keys::IS_APPROVED)
            .await?
            .map(|v| v == "true")
            .unwrap_or(false);
        let email = self.store.get(keys::EMAIL).await?;
        let patient_id = self
            .store
            .get(keys::PATIENT_ID)
            .await?
            .filter(|id| !id.is_empty());

        Ok(Some(Session {
            auth_token,
            role,
            user_id,
            display_name,
            approval_status,
            email,
            patient_id,
        }))
    }

    /// Returns the current session or an authentication error.
    ///
    /// Screens call this before any authenticated request and send the user
    /// to login on failure.
    pub async fn require(&self) -> Result<Session> {
        self.current().await?.ok_or_else(|| {
            DermascanError::Authentication("Please log in again.".to_string()).into()
        })
    }

    /// Removes every session key. Calling it with no session is a no-op.
    pub async fn teardown(&self) -> Result<()> {
        self.store.remove_many(keys::SESSION_KEYS).await?;
        tracing::info!("Session cleared");
        Ok(())
    }
}
