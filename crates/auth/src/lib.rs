use std::sync::Arc;

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use cuid2::CuidConstructor;
use once_cell::sync::Lazy;
use rand::RngCore;
use realty_catalog::validation::is_valid_email;
use realty_config::AuthConfig;
use realty_database::WeeklySchedule;
use serde::Serialize;
use sqlx::{Row, SqlitePool, Transaction};
use thiserror::Error;
use tracing::{debug, info};

const PASSWORD_PROVIDER: &str = "password";
const MAX_TTL_SECONDS: i64 = 100 * 365 * 24 * 60 * 60;

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

#[derive(Clone)]
pub struct Authenticator {
    pool: SqlitePool,
    session_ttl: Duration,
    reset_ttl: Duration,
    min_password_length: usize,
    notifier: Arc<dyn PasswordResetNotifier>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("name, email and password are required")]
    MissingFields,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password must have at least {min_length} characters")]
    WeakPassword { min_length: usize },
    #[error("user already exists")]
    UserExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("current password does not match")]
    WrongCurrentPassword,
    #[error("user not found")]
    UserNotFound,
    #[error("password reset token is invalid or already used")]
    InvalidResetToken,
    #[error("password reset token expired")]
    ResetTokenExpired,
    #[error("password reset notification failed: {0}")]
    Notification(anyhow::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("session not found")]
    SessionNotFound,
    #[error("session expired")]
    SessionExpired,
    #[error("invalid session token")]
    InvalidSession,
}

impl AuthError {
    /// Portuguese message suitable for showing to the admin.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::MissingFields => "Todos os campos são obrigatórios.".to_string(),
            AuthError::InvalidEmail => "O endereço de e-mail é inválido.".to_string(),
            AuthError::WeakPassword { min_length } => format!(
                "A senha é muito fraca. Ela deve ter pelo menos {min_length} caracteres."
            ),
            AuthError::UserExists => "Este e-mail já está em uso por outra conta.".to_string(),
            AuthError::InvalidCredentials => "Email ou senha incorretos.".to_string(),
            AuthError::WrongCurrentPassword => "A senha atual está incorreta.".to_string(),
            AuthError::UserNotFound => "Usuário não encontrado.".to_string(),
            AuthError::InvalidResetToken => {
                "O link de recuperação é inválido ou já foi utilizado.".to_string()
            }
            AuthError::ResetTokenExpired => "O link de recuperação expirou.".to_string(),
            AuthError::Notification(_) => "Falha ao enviar e-mail de recuperação.".to_string(),
            AuthError::SessionNotFound | AuthError::SessionExpired | AuthError::InvalidSession => {
                "Sua sessão expirou. Faça login novamente.".to_string()
            }
            AuthError::Database(_) | AuthError::PasswordHash(_) | AuthError::Serialization(_) => {
                "Ocorreu um erro inesperado. Tente novamente.".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    #[serde(skip_serializing)]
    pub id: i64,
    pub public_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// A freshly issued password reset token, handed to the notifier.
#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Delivers password reset tokens to their owner.
#[async_trait]
pub trait PasswordResetNotifier: Send + Sync {
    async fn send_reset(&self, reset: &PasswordReset) -> anyhow::Result<()>;
}

/// Notifier that only writes the reset to the log.
#[derive(Debug, Default, Clone)]
pub struct LoggingNotifier;

#[async_trait]
impl PasswordResetNotifier for LoggingNotifier {
    async fn send_reset(&self, reset: &PasswordReset) -> anyhow::Result<()> {
        info!(email = %reset.email, expires_at = %reset.expires_at, "password reset requested");
        debug!(token = %reset.token, "password reset token");
        Ok(())
    }
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: AuthConfig) -> Self {
        Self {
            pool,
            session_ttl: seconds(config.session_ttl_seconds),
            reset_ttl: seconds(config.password_reset_ttl_seconds),
            min_password_length: config.min_password_length,
            notifier: Arc::new(LoggingNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn PasswordResetNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    /// Create an admin account together with its password identity and an
    /// empty public broker profile.
    pub async fn register_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }
        self.check_strength(password)?;

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            return Err(AuthError::UserExists);
        }

        let now = now_rfc3339();
        let password_hash = hash_password(password)?;

        let user = insert_user(&mut tx, &email, name).await?;

        sqlx::query(
            "INSERT INTO user_identities (user_id, provider, provider_uid, secret, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(PASSWORD_PROVIDER)
        .bind(&email)
        .bind(password_hash)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let schedule = serde_json::to_string(&WeeklySchedule::default())?;

        sqlx::query(
            "INSERT INTO broker_profiles (user_id, name, creci, phone, email, schedule, is_public, created_at, updated_at) VALUES (?, ?, '', '', ?, ?, 1, ?, ?)",
        )
        .bind(user.id)
        .bind(name)
        .bind(&email)
        .bind(schedule)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(user = %user.public_id, "registered admin account");
        Ok(user)
    }

    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let identity = sqlx::query(
            "SELECT user_id, secret FROM user_identities WHERE provider = ? AND provider_uid = ?",
        )
        .bind(PASSWORD_PROVIDER)
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = identity else {
            return Err(AuthError::InvalidCredentials);
        };

        let secret: String = row.try_get("secret")?;
        verify_password(password, &secret).map_err(|_| AuthError::InvalidCredentials)?;

        let user_id: i64 = row.try_get("user_id")?;
        self.fetch_user(user_id).await?;

        self.issue_session(user_id).await
    }

    pub async fn authenticate_token(&self, token: &str) -> Result<(User, AuthSession), AuthError> {
        let row = sqlx::query("SELECT user_id, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::SessionNotFound);
        };

        let user_id: i64 = row.try_get("user_id")?;
        let expires_at: String = row.try_get("expires_at")?;

        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .map_err(|_| AuthError::InvalidSession)?
            .with_timezone(&Utc);

        if expires_at <= Utc::now() {
            sqlx::query("DELETE FROM sessions WHERE token = ?")
                .bind(token)
                .execute(&self.pool)
                .await?;
            return Err(AuthError::SessionExpired);
        }

        let user = self.fetch_user(user_id).await?;
        let session = AuthSession {
            token: token.to_owned(),
            user_id,
            expires_at,
        };

        Ok((user, session))
    }

    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn user_profile(&self, user_id: i64) -> Result<User, AuthError> {
        self.fetch_user(user_id).await
    }

    /// Issue a single-use reset token. Unknown addresses succeed without
    /// sending anything, so callers cannot discover which accounts exist.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let identity = sqlx::query(
            "SELECT user_id FROM user_identities WHERE provider = ? AND provider_uid = ?",
        )
        .bind(PASSWORD_PROVIDER)
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = identity else {
            debug!("password reset requested for unknown email");
            return Ok(());
        };
        let user_id: i64 = row.try_get("user_id")?;

        let token = generate_token();
        let now = Utc::now();
        let expires_at = now + self.reset_ttl;

        sqlx::query(
            "INSERT INTO password_resets (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&token)
        .bind(format_time(now))
        .bind(format_time(expires_at))
        .execute(&self.pool)
        .await?;

        let reset = PasswordReset {
            email,
            token,
            expires_at,
        };
        self.notifier
            .send_reset(&reset)
            .await
            .map_err(AuthError::Notification)
    }

    /// Consume a reset token, store the new password and sign out every
    /// session of the account.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        self.check_strength(new_password)?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT user_id, expires_at, used_at FROM password_resets WHERE token = ?")
            .bind(token)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::InvalidResetToken);
        };

        let used_at: Option<String> = row.try_get("used_at")?;
        if used_at.is_some() {
            return Err(AuthError::InvalidResetToken);
        }

        let expires_at: String = row.try_get("expires_at")?;
        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .map_err(|_| AuthError::InvalidResetToken)?
            .with_timezone(&Utc);
        if expires_at <= Utc::now() {
            return Err(AuthError::ResetTokenExpired);
        }

        let user_id: i64 = row.try_get("user_id")?;
        let now = now_rfc3339();

        store_password(&mut tx, user_id, new_password, &now).await?;

        sqlx::query("UPDATE password_resets SET used_at = ? WHERE token = ?")
            .bind(&now)
            .bind(token)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(user_id, "password reset completed");
        Ok(())
    }

    /// Change the password after re-checking the current one.
    pub async fn change_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if current_password.is_empty() || new_password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let row = sqlx::query("SELECT secret FROM user_identities WHERE user_id = ? AND provider = ?")
            .bind(user.id)
            .bind(PASSWORD_PROVIDER)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let secret: String = row.try_get("secret")?;
        verify_password(current_password, &secret).map_err(|_| AuthError::WrongCurrentPassword)?;

        self.check_strength(new_password)?;

        let mut tx = self.pool.begin().await?;
        store_password(&mut tx, user.id, new_password, &now_rfc3339()).await?;
        tx.commit().await?;

        info!(user = %user.public_id, "password changed");
        Ok(())
    }

    /// Hide the broker profile from public pages and end every session.
    pub async fn deactivate(&self, user: &User) -> Result<(), AuthError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE broker_profiles SET is_public = 0, updated_at = ? WHERE user_id = ?")
            .bind(now_rfc3339())
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(user = %user.public_id, "account deactivated");
        Ok(())
    }

    pub async fn delete_account(&self, user: &User) -> Result<(), AuthError> {
        let mut tx = self.pool.begin().await?;

        for statement in [
            "DELETE FROM broker_profiles WHERE user_id = ?",
            "DELETE FROM password_resets WHERE user_id = ?",
            "DELETE FROM sessions WHERE user_id = ?",
            "DELETE FROM user_identities WHERE user_id = ?",
        ] {
            sqlx::query(statement)
                .bind(user.id)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        tx.commit().await?;

        info!(user = %user.public_id, "account deleted");
        Ok(())
    }

    async fn fetch_user(&self, id: i64) -> Result<User, AuthError> {
        let row = sqlx::query("SELECT id, public_id, email, display_name FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(User {
            id,
            public_id: row.try_get("public_id")?,
            email: row.try_get("email")?,
            display_name: row.try_get("display_name")?,
        })
    }

    async fn issue_session(&self, user_id: i64) -> Result<AuthSession, AuthError> {
        let token = generate_token();
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        sqlx::query(
            "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&token)
        .bind(format_time(now))
        .bind(format_time(expires_at))
        .execute(&self.pool)
        .await?;

        Ok(AuthSession {
            token,
            user_id,
            expires_at,
        })
    }

    fn check_strength(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.min_password_length {
            return Err(AuthError::WeakPassword {
                min_length: self.min_password_length,
            });
        }
        Ok(())
    }
}

async fn insert_user(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    email: &str,
    display_name: &str,
) -> Result<User, AuthError> {
    let now = now_rfc3339();
    let public_id = CUID.create_id();

    let result = sqlx::query(
        "INSERT INTO users (public_id, email, display_name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&public_id)
    .bind(email)
    .bind(display_name)
    .bind(&now)
    .bind(&now)
    .execute(&mut **tx)
    .await?;

    Ok(User {
        id: result.last_insert_rowid(),
        public_id,
        email: Some(email.to_owned()),
        display_name: Some(display_name.to_owned()),
    })
}

async fn store_password(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    user_id: i64,
    password: &str,
    now: &str,
) -> Result<(), AuthError> {
    let hash = hash_password(password)?;
    let result = sqlx::query(
        "UPDATE user_identities SET secret = ?, updated_at = ? WHERE user_id = ? AND provider = ?",
    )
    .bind(hash)
    .bind(now)
    .bind(user_id)
    .bind(PASSWORD_PROVIDER)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AuthError::UserNotFound);
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, secret: &str) -> Result<(), argon2::password_hash::Error> {
    let stored_hash = PasswordHash::new(secret)?;
    Argon2::default().verify_password(password.as_bytes(), &stored_hash)
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn seconds(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX).min(MAX_TTL_SECONDS))
}

fn format_time(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn now_rfc3339() -> String {
    format_time(Utc::now())
}
