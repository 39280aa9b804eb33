// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, quiz},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, participant_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quiz).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store, generator, config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().expect("valid origin"),
        "http://127.0.0.1:3000".parse().expect("valid origin"),
        "http://localhost:5173".parse().expect("valid origin"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let authenticate = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        // Protected auth routes
        .merge(
            Router::new()
                .route("/refresh", post(auth::refresh))
                .route("/role", put(auth::update_role))
                .route("/me", get(auth::me))
                .layer(authenticate.clone()),
        );

    // Double middleware protection: Auth first, then role check
    let admin_quiz_routes = Router::new()
        .route("/create", post(quiz::create_quiz))
        .route("/admin/quizzes", get(quiz::list_admin_quizzes))
        .route("/admin/quiz/{id}/results", get(quiz::quiz_results))
        .layer(middleware::from_fn(admin_middleware))
        .layer(authenticate.clone());

    let participant_quiz_routes = Router::new()
        .route("/join/{code}", get(quiz::join_quiz))
        .route("/submit/{id}", post(quiz::submit_quiz))
        .layer(middleware::from_fn(participant_middleware))
        .layer(authenticate);

    let quiz_routes = Router::new()
        .merge(admin_quiz_routes)
        .merge(participant_quiz_routes);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/quiz", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
