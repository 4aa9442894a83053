use serde::{Deserialize, Serialize};

use crate::{
    model::entity::UserEntity,
    web::{UserRole, WebResult, validation::Validator},
};

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
    /// `student` (default) or `instructor`
    pub role: Option<String>,
}

/// Registration data that passed validation.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

impl RegisterBody {
    pub fn validate(self) -> WebResult<Registration> {
        let mut v = Validator::new();
        let name = v.text("name", &self.name, 2, 255);
        let email = v.email("email", &self.email);
        v.password("password", &self.password);

        let role = match self.role.as_deref() {
            None => Some(UserRole::Student),
            Some(role) => v.one_of(
                "role",
                role,
                |r| UserRole::parse(r).filter(|r| *r != UserRole::Admin),
                &["student", "instructor"],
            ),
        };

        v.finish()?;
        Ok(Registration {
            name,
            email,
            password: self.password,
            role: role.unwrap_or(UserRole::Student),
        })
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

impl LoginBody {
    /// Returns the normalised email.
    pub fn validate(&self) -> WebResult<String> {
        let mut v = Validator::new();
        let email = v.email("email", &self.email);
        v.required("password", &self.password);
        v.finish()?;
        Ok(email)
    }
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ProfileUpdateBody {
    pub name: String,
}

impl ProfileUpdateBody {
    pub fn validate(&self) -> WebResult<String> {
        let mut v = Validator::new();
        let name = v.text("name", &self.name, 2, 255);
        v.finish()?;
        Ok(name)
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserEntity,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: UserEntity,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by Google when the user cancels the consent screen.
    pub error: Option<String>,
}
