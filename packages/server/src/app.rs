//! Router wiring.

use crate::auth;
use crate::routes::{admin, assist, public, subscribe, upload};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

fn public_api() -> Router<AppState> {
    Router::new()
        .route("/pages/:name", get(public::get_page))
        .route("/settings/:name", get(public::get_settings))
        .route("/products", get(public::list_products))
        .route("/products/:slug", get(public::get_product))
        .route("/categories", get(public::list_categories))
        .route("/blog", get(public::list_posts))
        .route("/blog/:slug", get(public::get_post))
        .route("/subscribe/document", get(subscribe::subscribe_document))
        .route("/subscribe/collection", get(subscribe::subscribe_collection))
        .route("/contact", post(public::submit_contact))
        .route("/edit-path", get(public::edit_path))
}

fn admin_api() -> Router<AppState> {
    Router::new()
        .route("/products", get(admin::list_products).post(admin::create_product))
        .route(
            "/products/:key",
            get(admin::get_product)
                .put(admin::update_product)
                .delete(admin::delete_product),
        )
        .route("/categories", get(admin::list_categories).post(admin::create_category))
        .route(
            "/categories/:id",
            put(admin::rename_category).delete(admin::delete_category),
        )
        .route("/blog", get(admin::list_posts).post(admin::create_post))
        .route(
            "/blog/:id",
            get(admin::get_post).put(admin::update_post).delete(admin::delete_post),
        )
        .route("/pages/:name", put(admin::save_page))
        .route("/settings/:name", put(admin::save_settings))
        .route("/dashboard", get(admin::dashboard))
        .route("/media", get(upload::media))
        .route(
            "/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES)),
        )
        .route("/ai/sourcing", post(assist::sourcing))
        .route("/ai/content-suggestions", post(assist::content_suggestions))
        .route("/events", get(subscribe::error_events))
}

pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.uploads_dir);

    let mut router = Router::new()
        .nest("/api", public_api())
        .route("/admin", get(admin::home))
        .route("/admin/login", get(admin::login_form).post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .nest("/admin/api", admin_api())
        .nest_service("/uploads", uploads);

    if let Some(dir) = &state.public_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(middleware::from_fn_with_state(state.clone(), auth::guard))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
