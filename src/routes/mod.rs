mod attendance;
mod auth;
mod classes;
mod error;
mod extract;
mod health;
mod messages;
mod overview;
mod pages;
mod payments;
mod people;
mod session;
mod users;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
pub use error::{ApiError, ErrorInfo, ErrorResponse};
pub use extract::{BodyFormat, JsonOrForm};

use crate::AppState;

/// JSON API under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        .merge(school_routes())
}

/// School records: classes, people, attendance, fees, messages, overviews.
fn school_routes() -> Router<AppState> {
    Router::new()
        .route("/classes", get(classes::list).post(classes::create))
        .route(
            "/classes/{id}",
            get(classes::get).put(classes::update).delete(classes::delete),
        )
        .route(
            "/subjects",
            get(classes::list_subjects).post(classes::create_subject),
        )
        .route(
            "/subjects/{id}",
            get(classes::get_subject)
                .put(classes::update_subject)
                .delete(classes::delete_subject),
        )
        .route(
            "/students",
            get(people::list_students).post(people::create_student),
        )
        .route(
            "/students/{id}",
            get(people::get_student)
                .put(people::update_student)
                .delete(people::delete_student),
        )
        .route(
            "/teachers",
            get(people::list_teachers).post(people::create_teacher),
        )
        .route(
            "/teachers/{id}",
            get(people::get_teacher)
                .put(people::update_teacher)
                .delete(people::delete_teacher),
        )
        .route(
            "/parents/{id}/children",
            get(people::children).post(people::link_child),
        )
        .route(
            "/parents/{id}/children/{student_id}",
            delete(people::unlink_child),
        )
        .route("/parents/{id}/overview", get(overview::parent))
        .route("/admin/overview", get(overview::admin))
        .route("/attendance", get(attendance::list).post(attendance::record))
        .route(
            "/attendance/{id}",
            get(attendance::get)
                .put(attendance::update)
                .delete(attendance::delete),
        )
        .route("/payments", get(payments::list).post(payments::create))
        .route("/payments/{id}", patch(payments::update))
        .route("/messages", get(messages::list).post(messages::send))
        .route("/messages/conversation/{id}", get(messages::conversation))
        .route(
            "/messages/{id}",
            get(messages::get).delete(messages::delete),
        )
}

/// HTML pages. The protected ones sit behind the gate middleware.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(pages::login))
        .route("/register", get(pages::register))
        .route("/logout", get(pages::logout))
        .route("/unauthorized", get(pages::unauthorized))
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/{*section}", get(pages::dashboard_section))
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}
