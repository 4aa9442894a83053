//! Request context, e.g. user id, its role, etc.
//!

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::web::{WebResult, error::WebError};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user_id: uuid::Uuid,
    user_role: UserRole,
}

impl AuthenticatedUser {
    pub fn new(user_id: uuid::Uuid, user_role: UserRole) -> Self {
        Self { user_id, user_role }
    }

    /// System actor used for lookups that happen before a user is known.
    pub fn admin() -> Self {
        Self {
            user_role: UserRole::Admin,
            user_id: uuid::Uuid::max(), // admin ID
        }
    }

    pub fn user_id(&self) -> uuid::Uuid {
        self.user_id
    }

    pub fn user_role(&self) -> UserRole {
        self.user_role
    }

    pub fn is_admin(&self) -> bool {
        self.user_role == UserRole::Admin
    }

    /// Fails with 403 unless the user has one of `roles`.
    pub fn authorize(&self, roles: &[UserRole]) -> WebResult<()> {
        if roles.contains(&self.user_role) {
            Ok(())
        } else {
            Err(WebError::auth_insufficient_role(self.user_role))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Instructor,
    Student,
}

impl UserRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "instructor" => Some(Self::Instructor),
            "student" => Some(Self::Student),
            _ => None,
        }
    }
}

impl From<&str> for UserRole {
    fn from(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::Student)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Instructor => write!(f, "instructor"),
            Self::Student => write!(f, "student"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    maybe_user: Option<AuthenticatedUser>,
}

impl RequestContext {
    pub fn new(maybe_user: Option<AuthenticatedUser>) -> Self {
        Self { maybe_user }
    }

    pub fn admin() -> Self {
        Self::new(Some(AuthenticatedUser::admin()))
    }

    pub fn maybe_user(&self) -> Option<&AuthenticatedUser> {
        self.maybe_user.as_ref()
    }

    pub fn user(&self) -> WebResult<&AuthenticatedUser> {
        self.maybe_user.as_ref().ok_or(WebError::auth_required())
    }

    pub fn is_admin(&self) -> bool {
        self.maybe_user.as_ref().is_some_and(AuthenticatedUser::is_admin)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts.extensions.get::<RequestContext>();
        if let Some(ctx) = ctx {
            Ok(ctx.clone())
        } else {
            Ok(RequestContext::new(None))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn role_parse_test() {
        assert_eq!(UserRole::parse("instructor"), Some(UserRole::Instructor));
        assert_eq!(UserRole::parse("superuser"), None);
        assert_eq!(UserRole::from("unknown"), UserRole::Student);
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn authorize_test() {
        let student = AuthenticatedUser::new(uuid::Uuid::new_v4(), UserRole::Student);
        assert!(student.authorize(&[UserRole::Student, UserRole::Admin]).is_ok());

        let err = student
            .authorize(&[UserRole::Instructor, UserRole::Admin])
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);

        assert!(AuthenticatedUser::admin().is_admin());
        assert!(!RequestContext::new(None).is_admin());
    }

    #[test]
    fn anonymous_requires_auth_test() {
        let err = RequestContext::new(None).user().unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
