//! Authentication middleware
//!
//! Session token authentication and role-based access control

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use shared::Role;

use crate::error::{AppError, AppResult, ErrorDetail, ErrorResponse};
use crate::services::AuthService;
use crate::AppState;

/// Authenticated user information resolved from the session token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Admin passes every role gate
    pub fn has_role(&self, roles: &[Role]) -> bool {
        self.role == Role::Admin || roles.contains(&self.role)
    }

    /// Role guard for use in handlers
    pub fn require_role(&self, roles: &[Role]) -> AppResult<()> {
        if self.has_role(roles) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.user_id,
                role = %self.role,
                "Role gate rejected request"
            );
            Err(AppError::InsufficientPermissions)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Head judges and admins run competitions
    pub fn is_head_judge(&self) -> bool {
        matches!(self.role, Role::HeadJudge | Role::Admin)
    }
}

/// Authentication middleware that validates session tokens
///
/// The user is re-read from the store so deleted accounts lose access
/// immediately and role changes take effect without a new login.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return unauthorized_response("Missing or invalid Authorization header"),
    };

    let claims = match AuthService::verify_token(token, &state.config.auth.session_secret) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    let service = AuthService::new(state.store.clone(), &state.config);
    let user = match service.current_user(&claims.sub).await {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    });

    next.run(request).await
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            field: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| unauthorized_response("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: "USR-1".to_string(),
            name: "Test".to_string(),
            email: "t@coffee.test".to_string(),
            role,
        }
    }

    #[test]
    fn test_admin_passes_every_gate() {
        let admin = user(Role::Admin);
        assert!(admin.has_role(&[Role::Farmer]));
        assert!(admin.has_role(&[]));
    }

    #[test]
    fn test_role_gate() {
        let roaster = user(Role::Roaster);
        assert!(roaster.require_role(&[Role::Roaster]).is_ok());
        assert!(matches!(
            roaster.require_role(&[Role::Processor]),
            Err(AppError::InsufficientPermissions)
        ));
    }
}
