//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`, one scope per role
//! (`/api/patients`, `/api/doctors`, `/api/labs`, `/api/admins`). Every
//! scope mounts the same notification routes; domain routes differ.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS + `Cache-Control` → 2. Auth validator → 3. Audit logger

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{delete, get, post, put};
use axum::{Extension, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::{ApiContext, RoleScope};
use crate::core_state::CoreState;
use crate::models::enums::Role;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

/// Inbox routes, identical for every role. The caller's role must match the
/// `RoleScope` the group is mounted under.
fn notification_routes() -> Router<ApiContext> {
    Router::new()
        .route("/notifications", get(endpoints::notifications::list))
        .route(
            "/notifications/unread-count",
            get(endpoints::notifications::unread_count),
        )
        .route(
            "/notifications/read-all",
            put(endpoints::notifications::mark_all_read),
        )
        .route(
            "/notifications/:id/read",
            put(endpoints::notifications::mark_read),
        )
}

fn patient_routes() -> Router<ApiContext> {
    Router::new()
        .route("/doctors", get(endpoints::directory::doctors))
        .route("/labs", get(endpoints::directory::labs))
        .route("/appointments", post(endpoints::appointments::book))
        .route("/my-appointments", get(endpoints::appointments::list_mine))
        .route("/submissions", post(endpoints::submissions::create))
        .route("/my-submissions", get(endpoints::submissions::list_mine))
        .route(
            "/submissions/:id/feedback-request",
            post(endpoints::submissions::request_doctor_feedback),
        )
}

fn doctor_routes() -> Router<ApiContext> {
    Router::new()
        .route("/my-appointments", get(endpoints::appointments::list_mine))
        .route(
            "/appointments/:id/status",
            put(endpoints::appointments::update_status),
        )
        .route("/patients", get(endpoints::directory::linked_patients))
        .route(
            "/submissions/:id/feedback",
            put(endpoints::submissions::write_feedback),
        )
        .route(
            "/submissions/:id/feedback-request",
            post(endpoints::submissions::request_patient_feedback),
        )
        .route("/lab-tests", post(endpoints::lab_tests::request))
        .route(
            "/lab-tests/:id/feedback",
            put(endpoints::lab_tests::result_feedback),
        )
}

fn lab_routes() -> Router<ApiContext> {
    Router::new()
        .route("/appointments", get(endpoints::appointments::list_mine))
        .route(
            "/appointments/:id",
            put(endpoints::appointments::update_status),
        )
        .route("/queue", get(endpoints::lab_tests::queue))
        .route("/tests/:id/schedule", put(endpoints::lab_tests::schedule))
        .route("/tests/:id/upload", post(endpoints::lab_tests::upload))
        .route(
            "/tests/:id/appointment-request",
            post(endpoints::lab_tests::appointment_request),
        )
}

fn admin_routes() -> Router<ApiContext> {
    Router::new()
        .route(
            "/pending-verifications",
            get(endpoints::admin::pending),
        )
        .route("/doctors/:id/verify", put(endpoints::admin::verify_doctor))
        .route("/labs/:id/verify", put(endpoints::admin::verify_lab))
        .route(
            "/users/:id",
            put(endpoints::admin::update_user).delete(endpoints::admin::deactivate_user),
        )
        .route("/submissions/:id", delete(endpoints::admin::delete_submission))
        .route(
            "/appointments/:id",
            put(endpoints::admin::update_appointment).delete(endpoints::admin::delete_appointment),
        )
        .route(
            "/lab-tests/:id",
            put(endpoints::admin::update_lab_test).delete(endpoints::admin::delete_lab_test),
        )
}

fn scoped(role: Role, domain: Router<ApiContext>) -> Router<ApiContext> {
    notification_routes()
        .merge(domain)
        .layer(Extension(RoleScope(role)))
}

fn build_router(ctx: ApiContext) -> Router {
    // Protected routes: auth + audit.
    //
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Auth → Audit (innermost) → Handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let mut protected = Router::new()
        .route("/users/me", get(endpoints::users::me))
        .route("/users/logout", post(endpoints::users::logout));

    for role in Role::ALL {
        let domain = match role {
            Role::Patient => patient_routes(),
            Role::Doctor => doctor_routes(),
            Role::Lab => lab_routes(),
            Role::Admin => admin_routes(),
        };
        protected = protected.nest(&format!("/{}", role.scope()), scoped(role, domain));
    }

    let protected = protected
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(Extension(ctx.clone()));

    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(cors)
}
