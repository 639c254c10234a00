//! Authentication service for login and session token management

use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::{Role, User};
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::store::Store;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Store,
    session_secret: String,
    session_ttl_secs: i64,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Response after a successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(store: Store, config: &Config) -> Self {
        Self {
            store,
            session_secret: config.auth.session_secret.clone(),
            session_ttl_secs: config.auth.session_ttl_secs,
        }
    }

    /// Check credentials against the user list and issue a session token
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        input.validate()?;

        let (user, dummy_hash) = {
            let data = self.store.read().await;
            (
                data.user_by_email(&input.email).cloned(),
                data.login_dummy_hash.clone(),
            )
        };

        let user = match user {
            Some(user) => user,
            None => {
                let _ = verify(&input.password, &dummy_hash);
                tracing::warn!(email = %input.email, "Login attempt for unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        let valid = verify(&input.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))?;
        if !valid {
            tracing::warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.session_ttl_secs,
            user,
        })
    }

    /// Sign a session token for a user
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.session_ttl_secs)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.session_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token encoding error: {}", e)))
    }

    /// Validate a session token
    pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })
    }

    /// Look up the user behind a session
    pub async fn current_user(&self, user_id: &str) -> AppResult<User> {
        let data = self.store.read().await;
        data.user(user_id)
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Session user no longer exists".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{new_store, AppData};

    fn service(ttl: i64) -> AuthService {
        let mut config = Config::default();
        config.auth.session_ttl_secs = ttl;
        AuthService::new(new_store(AppData::default()), &config)
    }

    fn user() -> User {
        User {
            id: "USR-00000001".to_string(),
            name: "Tester".to_string(),
            email: "tester@coffee.test".to_string(),
            role: Role::Roaster,
            password_hash: String::new(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let svc = service(3600);
        let token = svc.issue_token(&user()).unwrap();
        let claims = AuthService::verify_token(&token, "development-secret-key").unwrap();
        assert_eq!(claims.sub, "USR-00000001");
        assert_eq!(claims.role, Role::Roaster);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service(3600).issue_token(&user()).unwrap();
        assert!(matches!(
            AuthService::verify_token(&token, "other-secret"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s leeway
        let token = service(-120).issue_token(&user()).unwrap();
        assert!(matches!(
            AuthService::verify_token(&token, "development-secret-key"),
            Err(AppError::TokenExpired)
        ));
    }
}
