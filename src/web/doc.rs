use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct AuthModifier;

impl Modify for AuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "SID",
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "coursehub", description = "Online course platform API"),
    paths(
        crate::web::routes::health_handler,
        crate::web::routes::auth::register_handler,
        crate::web::routes::auth::login_handler,
        crate::web::routes::auth::profile_handler,
        crate::web::routes::auth::profile_update_handler,
        crate::web::routes::auth::google_start_handler,
        crate::web::routes::auth::google_callback_handler,
        crate::web::routes::users::user_list_handler,
        crate::web::routes::courses::course_create_handler,
        crate::web::routes::courses::course_list_handler,
        crate::web::routes::courses::course_get_handler,
        crate::web::routes::courses::course_update_handler,
        crate::web::routes::courses::course_delete_handler,
        crate::web::routes::courses::course_approve_handler,
        crate::web::routes::courses::course_publish_handler,
        crate::web::routes::content::module_create_handler,
        crate::web::routes::content::module_update_handler,
        crate::web::routes::content::module_delete_handler,
        crate::web::routes::content::lesson_create_handler,
        crate::web::routes::content::lesson_update_handler,
        crate::web::routes::content::lesson_delete_handler,
        crate::web::routes::enrollments::enroll_handler,
        crate::web::routes::enrollments::my_courses_handler,
        crate::web::routes::enrollments::course_progress_handler,
        crate::web::routes::enrollments::lesson_progress_handler,
        crate::web::routes::enrollments::unenroll_handler,
    ),
    modifiers(&AuthModifier),
)]
pub struct ApiDoc;
