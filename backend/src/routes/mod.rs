//! Route definitions for the Coffee Traceability & Quality Platform

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Login (public)
        .route("/auth/login", post(handlers::login))
        // Public traceability route (unauthenticated - for QR code scanning)
        .route("/trace/:lot_id", get(handlers::get_traceability_view))
        .merge(protected_routes(state))
}

/// Everything behind a session token
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::me))
        .route("/dashboard", get(handlers::get_dashboard))
        .nest("/farms", farm_routes())
        .nest("/harvest-lots", harvest_routes())
        .nest("/processing", processing_routes())
        .nest("/milling", milling_routes())
        .nest("/inventory", inventory_routes())
        .nest("/roasting", roasting_routes())
        .nest("/cupping", cupping_routes())
        .nest("/reports", report_routes())
        .nest("/admin", admin_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Farm and GAP log routes
fn farm_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_farms).post(handlers::create_farm))
        .route(
            "/:farm_id",
            get(handlers::get_farm).put(handlers::update_farm),
        )
        .route(
            "/:farm_id/gap",
            get(handlers::list_gap_entries).post(handlers::record_gap_entry),
        )
}

/// Harvest lot routes
fn harvest_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_harvest_lots).post(handlers::register_harvest_lot),
        )
        .route("/export", get(handlers::export_harvest_lots))
        .route("/:lot_id", get(handlers::get_harvest_lot))
}

/// Processing (kanban) routes
fn processing_routes() -> Router<AppState> {
    Router::new()
        .route("/board", get(handlers::get_board))
        .route(
            "/batches",
            get(handlers::list_batches).post(handlers::start_batch),
        )
        .route("/batches/:batch_id", get(handlers::get_batch))
        .route("/batches/:batch_id/drying", post(handlers::add_drying_reading))
        .route("/batches/:batch_id/move", post(handlers::move_batch))
}

/// Dry mill routes
fn milling_routes() -> Router<AppState> {
    Router::new()
        .route("/parchment", get(handlers::list_parchment_lots))
        .route("/parchment/:parchment_id", get(handlers::get_parchment_lot))
        .route(
            "/parchment/:parchment_id/lab-results",
            put(handlers::record_lab_results),
        )
        .route("/parchment/:parchment_id/hull", post(handlers::hull_and_grade))
}

/// Green bean inventory routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/green-lots", get(handlers::list_green_lots))
        .route("/green-lots/:lot_id", get(handlers::get_green_lot))
        .route(
            "/green-lots/:lot_id/withdraw",
            post(handlers::withdraw_green_lot),
        )
        .route(
            "/green-lots/:lot_id/availability",
            put(handlers::set_green_lot_availability),
        )
}

/// Roaster routes
fn roasting_routes() -> Router<AppState> {
    Router::new()
        .route("/claims", post(handlers::claim_green_coffee))
        .route("/inventory", get(handlers::list_roaster_inventory))
        .route(
            "/batches",
            get(handlers::list_roast_batches).post(handlers::record_roast_batch),
        )
}

/// Cupping session routes
fn cupping_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sessions",
            get(handlers::list_cupping_sessions).post(handlers::create_cupping_session),
        )
        .route("/qc", post(handlers::create_qc_session))
        .route("/sessions/:session_id", get(handlers::get_cupping_session))
        .route("/sessions/:session_id/judges", post(handlers::add_session_judge))
        .route("/sessions/:session_id/samples", post(handlers::add_session_sample))
        .route(
            "/sessions/:session_id/advance",
            post(handlers::advance_cupping_session),
        )
        .route("/sessions/:session_id/scores", post(handlers::submit_score))
        .route(
            "/sessions/:session_id/scores/:sample_id/:judge_id",
            put(handlers::override_score),
        )
}

/// AI report routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/lots/:lot_id", post(handlers::generate_lot_report))
        .route("/sessions/:session_id", post(handlers::generate_session_report))
}

/// Administration routes
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/users/:user_id", delete(handlers::delete_user))
        .route("/farms/:farm_id", delete(handlers::delete_farm))
        .route("/harvest-lots/:lot_id", delete(handlers::delete_harvest_lot))
        .route("/green-lots/:lot_id", delete(handlers::delete_green_lot))
        .route("/sessions/:session_id", delete(handlers::delete_cupping_session))
}
