use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, SecondsFormat, Utc};
use realty_auth::{AuthError, Authenticator, PasswordReset, PasswordResetNotifier};
use realty_config::AuthConfig;
use realty_database::MIGRATOR;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Row, SqlitePool,
};
use tempfile::TempDir;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

const EMAIL: &str = "genilson@grimoveis.com.br";
const PASSWORD: &str = "segredo123";

#[derive(Default)]
struct RecordingNotifier {
    resets: Mutex<Vec<PasswordReset>>,
}

impl RecordingNotifier {
    fn last_token(&self) -> Option<String> {
        self.resets
            .lock()
            .unwrap()
            .last()
            .map(|reset| reset.token.clone())
    }

    fn count(&self) -> usize {
        self.resets.lock().unwrap().len()
    }
}

#[async_trait]
impl PasswordResetNotifier for RecordingNotifier {
    async fn send_reset(&self, reset: &PasswordReset) -> anyhow::Result<()> {
        self.resets.lock().unwrap().push(reset.clone());
        Ok(())
    }
}

struct TestContext {
    pool: SqlitePool,
    authenticator: Authenticator,
    notifier: Arc<RecordingNotifier>,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("auth.sqlite");
        let db_url = format!("sqlite://{}", db_path.display());

        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;

        let notifier = Arc::new(RecordingNotifier::default());
        let authenticator = Authenticator::new(pool.clone(), AuthConfig::default())
            .with_notifier(notifier.clone());

        Ok(Self {
            pool,
            authenticator,
            notifier,
            _temp_dir: temp_dir,
        })
    }

    async fn session_count(&self, user_id: i64) -> TestResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }
}

#[tokio::test]
async fn register_admin_creates_user_identity_and_public_profile() -> TestResult {
    let ctx = TestContext::new().await?;

    let user = ctx
        .authenticator
        .register_admin("Genilson Rios", EMAIL, PASSWORD)
        .await?;

    assert_eq!(user.email.as_deref(), Some(EMAIL));
    assert_eq!(user.display_name.as_deref(), Some("Genilson Rios"));

    let identity = sqlx::query("SELECT provider, secret FROM user_identities WHERE user_id = ?")
        .bind(user.id)
        .fetch_one(&ctx.pool)
        .await?;
    let provider: String = identity.try_get("provider")?;
    let secret: String = identity.try_get("secret")?;
    assert_eq!(provider, "password");
    assert_ne!(secret, PASSWORD);
    assert!(secret.starts_with("$argon2"));

    let profile = sqlx::query("SELECT name, email, is_public FROM broker_profiles WHERE user_id = ?")
        .bind(user.id)
        .fetch_one(&ctx.pool)
        .await?;
    let name: String = profile.try_get("name")?;
    let is_public: bool = profile.try_get("is_public")?;
    assert_eq!(name, "Genilson Rios");
    assert!(is_public);

    Ok(())
}

#[tokio::test]
async fn register_admin_validates_input() -> TestResult {
    let ctx = TestContext::new().await?;

    assert!(matches!(
        ctx.authenticator.register_admin("", EMAIL, PASSWORD).await,
        Err(AuthError::MissingFields)
    ));
    assert!(matches!(
        ctx.authenticator.register_admin("Ana", EMAIL, "12345").await,
        Err(AuthError::WeakPassword { min_length: 6 })
    ));
    assert!(matches!(
        ctx.authenticator.register_admin("Ana", "not-an-email", PASSWORD).await,
        Err(AuthError::InvalidEmail)
    ));

    ctx.authenticator.register_admin("Ana", EMAIL, PASSWORD).await?;
    let duplicate = ctx
        .authenticator
        .register_admin("Outra Ana", &EMAIL.to_uppercase(), PASSWORD)
        .await;
    assert!(matches!(duplicate, Err(AuthError::UserExists)));

    Ok(())
}

#[tokio::test]
async fn register_admin_uses_the_profile_email_rules() -> TestResult {
    let ctx = TestContext::new().await?;

    for email in ["a@b.c", "corretor@localhost", "corretor@@imoveis.com"] {
        assert!(!realty_catalog::validation::is_valid_email(email));
        assert!(matches!(
            ctx.authenticator.register_admin("Ana", email, PASSWORD).await,
            Err(AuthError::InvalidEmail)
        ));
    }

    let user = ctx
        .authenticator
        .register_admin("Ana", "  Ana.Rios+vendas@Imoveis.com.br ", PASSWORD)
        .await?;
    assert_eq!(user.email.as_deref(), Some("ana.rios+vendas@imoveis.com.br"));

    Ok(())
}

#[tokio::test]
async fn login_and_authenticate_token_round_trip() -> TestResult {
    let ctx = TestContext::new().await?;
    let user = ctx
        .authenticator
        .register_admin("Genilson", EMAIL, PASSWORD)
        .await?;

    let session = ctx.authenticator.login_with_password(EMAIL, PASSWORD).await?;
    assert_eq!(session.user_id, user.id);
    assert!(session.expires_at > Utc::now() + Duration::hours(4));

    let (authenticated, _) = ctx.authenticator.authenticate_token(&session.token).await?;
    assert_eq!(authenticated.public_id, user.public_id);

    let wrong = ctx.authenticator.login_with_password(EMAIL, "errada").await;
    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

    let unknown = ctx
        .authenticator
        .login_with_password("ninguem@example.com", PASSWORD)
        .await;
    assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));

    Ok(())
}

#[tokio::test]
async fn expired_sessions_are_deleted() -> TestResult {
    let ctx = TestContext::new().await?;
    let user = ctx
        .authenticator
        .register_admin("Genilson", EMAIL, PASSWORD)
        .await?;
    let session = ctx.authenticator.login_with_password(EMAIL, PASSWORD).await?;

    let past = (Utc::now() - Duration::minutes(1)).to_rfc3339_opts(SecondsFormat::Micros, true);
    sqlx::query("UPDATE sessions SET expires_at = ? WHERE token = ?")
        .bind(past)
        .bind(&session.token)
        .execute(&ctx.pool)
        .await?;

    let result = ctx.authenticator.authenticate_token(&session.token).await;
    assert!(matches!(result, Err(AuthError::SessionExpired)));
    assert_eq!(ctx.session_count(user.id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn logout_removes_session() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.authenticator
        .register_admin("Genilson", EMAIL, PASSWORD)
        .await?;
    let session = ctx.authenticator.login_with_password(EMAIL, PASSWORD).await?;

    ctx.authenticator.logout(&session.token).await?;

    let result = ctx.authenticator.authenticate_token(&session.token).await;
    assert!(matches!(result, Err(AuthError::SessionNotFound)));
    Ok(())
}

#[tokio::test]
async fn password_reset_is_single_use_and_revokes_sessions() -> TestResult {
    let ctx = TestContext::new().await?;
    let user = ctx
        .authenticator
        .register_admin("Genilson", EMAIL, PASSWORD)
        .await?;
    ctx.authenticator.login_with_password(EMAIL, PASSWORD).await?;

    ctx.authenticator.request_password_reset(EMAIL).await?;
    let token = ctx.notifier.last_token().expect("reset token delivered");

    ctx.authenticator.reset_password(&token, "novasenha").await?;
    assert_eq!(ctx.session_count(user.id).await?, 0);

    let reused = ctx.authenticator.reset_password(&token, "outrasenha").await;
    assert!(matches!(reused, Err(AuthError::InvalidResetToken)));

    assert!(ctx
        .authenticator
        .login_with_password(EMAIL, PASSWORD)
        .await
        .is_err());
    ctx.authenticator.login_with_password(EMAIL, "novasenha").await?;

    Ok(())
}

#[tokio::test]
async fn password_reset_for_unknown_email_is_silent() -> TestResult {
    let ctx = TestContext::new().await?;

    ctx.authenticator
        .request_password_reset("ninguem@example.com")
        .await?;
    assert_eq!(ctx.notifier.count(), 0);
    Ok(())
}

#[tokio::test]
async fn expired_reset_token_is_rejected() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.authenticator
        .register_admin("Genilson", EMAIL, PASSWORD)
        .await?;
    ctx.authenticator.request_password_reset(EMAIL).await?;
    let token = ctx.notifier.last_token().expect("reset token delivered");

    let past = (Utc::now() - Duration::seconds(5)).to_rfc3339_opts(SecondsFormat::Micros, true);
    sqlx::query("UPDATE password_resets SET expires_at = ?")
        .bind(past)
        .execute(&ctx.pool)
        .await?;

    let result = ctx.authenticator.reset_password(&token, "novasenha").await;
    assert!(matches!(result, Err(AuthError::ResetTokenExpired)));
    Ok(())
}

#[tokio::test]
async fn change_password_requires_current_password() -> TestResult {
    let ctx = TestContext::new().await?;
    let user = ctx
        .authenticator
        .register_admin("Genilson", EMAIL, PASSWORD)
        .await?;

    let wrong = ctx
        .authenticator
        .change_password(&user, "chute", "novasenha")
        .await;
    let error = wrong.expect_err("wrong current password must fail");
    assert_eq!(error.user_message(), "A senha atual está incorreta.");

    let weak = ctx.authenticator.change_password(&user, PASSWORD, "123").await;
    assert!(matches!(weak, Err(AuthError::WeakPassword { .. })));

    ctx.authenticator
        .change_password(&user, PASSWORD, "novasenha")
        .await?;
    ctx.authenticator.login_with_password(EMAIL, "novasenha").await?;
    Ok(())
}

#[tokio::test]
async fn deactivate_hides_profile_and_ends_sessions() -> TestResult {
    let ctx = TestContext::new().await?;
    let user = ctx
        .authenticator
        .register_admin("Genilson", EMAIL, PASSWORD)
        .await?;
    ctx.authenticator.login_with_password(EMAIL, PASSWORD).await?;

    ctx.authenticator.deactivate(&user).await?;

    let row = sqlx::query("SELECT is_public FROM broker_profiles WHERE user_id = ?")
        .bind(user.id)
        .fetch_one(&ctx.pool)
        .await?;
    let is_public: bool = row.try_get("is_public")?;
    assert!(!is_public);
    assert_eq!(ctx.session_count(user.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn delete_account_removes_everything() -> TestResult {
    let ctx = TestContext::new().await?;
    let user = ctx
        .authenticator
        .register_admin("Genilson", EMAIL, PASSWORD)
        .await?;
    ctx.authenticator.login_with_password(EMAIL, PASSWORD).await?;

    ctx.authenticator.delete_account(&user).await?;

    for table in ["users", "user_identities", "sessions", "broker_profiles"] {
        let row = sqlx::query(&format!("SELECT COUNT(*) AS count FROM {table}"))
            .fetch_one(&ctx.pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        assert_eq!(count, 0, "{table} should be empty");
    }

    // The address can be registered again.
    ctx.authenticator
        .register_admin("Genilson", EMAIL, PASSWORD)
        .await?;
    Ok(())
}
