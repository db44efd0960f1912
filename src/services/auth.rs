use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{PublicUser, Role, User};
use crate::store::Store;
use crate::utils::error::AppError;

const BOOTSTRAP_ADMIN_EMAIL: &str = "admin@demo.com";
const BOOTSTRAP_ADMIN_PASSWORD: &str = "admin123";
const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// JWT payload: subject is the user's email.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    jwt_secret: String,
    token_ttl_hours: i64,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, jwt_secret: impl Into<String>, token_ttl_hours: i64) -> Self {
        Self {
            store,
            jwt_secret: jwt_secret.into(),
            token_ttl_hours,
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<AuthResponse, AppError> {
        if request.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".into()));
        }
        if request.email.trim().is_empty() {
            return Err(AppError::Validation("Email is required".into()));
        }
        if request.password.is_empty() {
            return Err(AppError::Validation("Password is required".into()));
        }
        if self
            .store
            .find_user_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Email already exists".into()));
        }

        let role = match request.role.as_deref() {
            Some(r) if r.eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::User,
        };

        let user = User {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            password_hash: hash_password(&request.password)?,
            role,
        };
        self.store.insert_user(&user).await?;

        // Signup doubles as the first login
        let token = self.issue_token(&user.email)?;
        Ok(AuthResponse {
            user: PublicUser::from(&user),
            token,
        })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        let user = self
            .store
            .find_user_by_email(request.email.trim())
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

        if !verify_password(&user.password_hash, &request.password) {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        let token = self.issue_token(&user.email)?;
        Ok(AuthResponse {
            user: PublicUser::from(&user),
            token,
        })
    }

    /// Resolves the user bound to a bearer token.
    pub async fn current_user(&self, token: &str) -> Result<User, AppError> {
        let claims = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?
        .claims;

        self.store
            .find_user_by_email(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".into()))
    }

    /// Creates the well-known admin account on first run. Development
    /// convenience, not a provisioning mechanism.
    pub async fn ensure_bootstrap_admin(&self) -> Result<(), AppError> {
        if self
            .store
            .find_user_by_email(BOOTSTRAP_ADMIN_EMAIL)
            .await?
            .is_some()
        {
            tracing::debug!(email = BOOTSTRAP_ADMIN_EMAIL, "Admin account already exists");
            return Ok(());
        }

        let admin = User {
            id: Uuid::new_v4(),
            name: "Admin User".into(),
            email: BOOTSTRAP_ADMIN_EMAIL.into(),
            password_hash: hash_password(BOOTSTRAP_ADMIN_PASSWORD)?,
            role: Role::Admin,
        };
        self.store.insert_user(&admin).await?;
        tracing::info!(email = BOOTSTRAP_ADMIN_EMAIL, "Created default admin account");
        Ok(())
    }

    fn issue_token(&self, email: &str) -> Result<String, AppError> {
        let exp = Utc::now()
            .checked_add_signed(Duration::hours(self.token_ttl_hours))
            .ok_or_else(|| AppError::Internal("Token expiry out of range".into()))?
            .timestamp() as usize;

        let claims = Claims {
            sub: email.to_string(),
            exp,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to encode token: {e}")))
    }
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt: [u8; 16] = rand::thread_rng().gen();
    argon2::hash_encoded(password.as_bytes(), &salt, &argon2::Config::default())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

fn verify_password(hash: &str, password: &str) -> bool {
    argon2::verify_encoded(hash, password.as_bytes()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemStore::new()), "test-secret", 1)
    }

    fn signup_request(email: &str, role: Option<&str>) -> SignupRequest {
        SignupRequest {
            name: "Ada".into(),
            email: email.into(),
            password: "pw123456".into(),
            role: role.map(String::from),
        }
    }

    #[tokio::test]
    async fn signup_defaults_to_user_role() {
        let auth = service();
        let response = auth
            .signup(signup_request("ada@example.com", None))
            .await
            .unwrap();
        assert_eq!(response.user.role, "user");
        assert!(!response.token.is_empty());
    }

    #[tokio::test]
    async fn signup_grants_admin_only_when_asked() {
        let auth = service();
        let response = auth
            .signup(signup_request("root@example.com", Some("ADMIN")))
            .await
            .unwrap();
        assert_eq!(response.user.role, "admin");
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let auth = service();
        auth.signup(signup_request("ada@example.com", None))
            .await
            .unwrap();
        let err = auth
            .signup(signup_request("ada@example.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn login_round_trip_and_token_resolution() {
        let auth = service();
        auth.signup(signup_request("ada@example.com", None))
            .await
            .unwrap();

        let response = auth
            .login(LoginRequest {
                email: "ada@example.com".into(),
                password: "pw123456".into(),
            })
            .await
            .unwrap();

        let user = auth.current_user(&response.token).await.unwrap();
        assert_eq!(user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let auth = service();
        auth.signup(signup_request("ada@example.com", None))
            .await
            .unwrap();

        let err = auth
            .login(LoginRequest {
                email: "ada@example.com".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let auth = service();
        assert!(matches!(
            auth.current_user("not-a-jwt").await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn bootstrap_admin_is_idempotent() {
        let auth = service();
        auth.ensure_bootstrap_admin().await.unwrap();
        auth.ensure_bootstrap_admin().await.unwrap();

        let admin = auth
            .login(LoginRequest {
                email: BOOTSTRAP_ADMIN_EMAIL.into(),
                password: BOOTSTRAP_ADMIN_PASSWORD.into(),
            })
            .await
            .unwrap();
        assert_eq!(admin.user.role, "admin");
    }
}
