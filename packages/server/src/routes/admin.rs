//! Admin API. Everything here sits behind the session guard; writes go
//! through an [`EditSession`](pharmasite_editor::EditSession) acting as the
//! signed-in user, so the store's rules still decide what sticks.

use super::{documents_json, save_response};
use crate::auth::{Authenticator, CurrentUser, ADMIN_HOME, LOGIN_PATH};
use crate::error::{
    api_bad_request, api_internal, api_not_found, api_unauthorized, api_validation_error, ApiError, ApiResult,
};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use pharmasite_common::path::{BLOGS, PRODUCTS, PRODUCT_CATEGORIES};
use pharmasite_common::{AdminSettings, DocPath, FooterSettings, PageName, SettingsName, WebsiteSettings};
use pharmasite_editor::{BlogPostForm, CategoryForm, NextStep, PageContent, ProductForm};
use pharmasite_store::{Direction, Document, DocumentStore, Principal, Query, Role};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub next: NextStep,
}

pub async fn login_form() -> Json<Value> {
    Json(json!({ "authenticated": false, "fields": ["email", "password"] }))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let Some(principal) = state.auth.login(&request.email, &request.password) else {
        warn!(email = %request.email, "Failed sign-in");
        return Err(api_unauthorized("Invalid email or password."));
    };

    let token = state
        .auth
        .issue(&principal)
        .map_err(|e| api_internal("Could not start a session", &e))?;
    info!(email = %request.email, "Signed in");

    Ok((
        jar.add(state.auth.session_cookie(token)),
        Json(LoginResponse {
            success: true,
            next: NextStep::Navigate(ADMIN_HOME.to_string()),
        }),
    ))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<LoginResponse>) {
    (
        jar.remove(Authenticator::removal_cookie()),
        Json(LoginResponse {
            success: true,
            next: NextStep::Navigate(LOGIN_PATH.to_string()),
        }),
    )
}

/// Who is signed in and the sidebar they get
pub async fn home(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<Value>> {
    let Principal::User { email, role } = &user.0 else {
        return Err(api_unauthorized("Not signed in"));
    };
    let settings = state
        .store
        .client(user.0.clone())
        .get_document(&SettingsName::Admin.doc_path())
        .await?;

    Ok(Json(json!({
        "email": email,
        "canEdit": *role == Role::Editor,
        "settings": settings.map(|d| d.to_json()),
    })))
}

pub async fn dashboard(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "products": state.store.count(PRODUCTS),
        "categories": state.store.count(PRODUCT_CATEGORIES),
        "posts": state.store.count(BLOGS),
    }))
}

/// Decode a JSON body into `T`, reporting shape errors as validation failures
fn decode<T: DeserializeOwned>(body: Value) -> ApiResult<T> {
    serde_json::from_value(body).map_err(|e| api_validation_error(&e.to_string()))
}

async fn list(state: &AppState, user: CurrentUser, collection: &str, field: &str, direction: Direction) -> ApiResult<Json<Vec<Value>>> {
    let query = Query::collection(collection).order_by(field, direction);
    Ok(documents_json(state.store.client(user.0).query(&query).await?))
}

async fn by_id(state: &AppState, principal: &Principal, collection: &str, id: &str) -> ApiResult<Option<Document>> {
    let path = DocPath::new(collection, id).map_err(|e| api_bad_request(&e.to_string()))?;
    Ok(state.store.client(principal.clone()).get_document(&path).await?)
}

// Products

pub async fn list_products(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<Vec<Value>>> {
    list(&state, user, PRODUCTS, "name", Direction::Asc).await
}

pub async fn create_product(State(state): State<AppState>, user: CurrentUser, Json(form): Json<ProductForm>) -> Response {
    save_response(state.session(&user.0).save_product(&form, None).await)
}

/// `key` is an id, or a slug when no product has that id
pub async fn get_product(State(state): State<AppState>, user: CurrentUser, Path(key): Path<String>) -> ApiResult<Json<Value>> {
    if let Some(doc) = by_id(&state, &user.0, PRODUCTS, &key).await? {
        return Ok(Json(doc.to_json()));
    }

    let query = Query::collection(PRODUCTS).where_eq("slug", key.as_str()).limit(1);
    state
        .store
        .client(user.0)
        .query(&query)
        .await?
        .into_iter()
        .next()
        .map(|d| Json(d.to_json()))
        .ok_or_else(|| api_not_found("Product not found"))
}

pub async fn update_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(form): Json<ProductForm>,
) -> Response {
    save_response(state.session(&user.0).save_product(&form, Some(&id)).await)
}

pub async fn delete_product(State(state): State<AppState>, user: CurrentUser, Path(id): Path<String>) -> Response {
    save_response(state.session(&user.0).delete_product(&id).await)
}

// Categories

pub async fn list_categories(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<Vec<Value>>> {
    list(&state, user, PRODUCT_CATEGORIES, "name", Direction::Asc).await
}

pub async fn create_category(State(state): State<AppState>, user: CurrentUser, Json(form): Json<CategoryForm>) -> Response {
    save_response(state.session(&user.0).add_category(&form).await)
}

pub async fn rename_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(form): Json<CategoryForm>,
) -> Response {
    save_response(state.session(&user.0).rename_category(&id, &form).await)
}

pub async fn delete_category(State(state): State<AppState>, user: CurrentUser, Path(id): Path<String>) -> Response {
    save_response(state.session(&user.0).delete_category(&id).await)
}

// Blog

pub async fn list_posts(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<Vec<Value>>> {
    list(&state, user, BLOGS, "date", Direction::Desc).await
}

pub async fn create_post(State(state): State<AppState>, user: CurrentUser, Json(form): Json<BlogPostForm>) -> Response {
    save_response(state.session(&user.0).save_blog_post(&form, None).await)
}

pub async fn get_post(State(state): State<AppState>, user: CurrentUser, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    by_id(&state, &user.0, BLOGS, &id)
        .await?
        .map(|d| Json(d.to_json()))
        .ok_or_else(|| api_not_found("Post not found"))
}

pub async fn update_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(form): Json<BlogPostForm>,
) -> Response {
    save_response(state.session(&user.0).save_blog_post(&form, Some(&id)).await)
}

pub async fn delete_post(State(state): State<AppState>, user: CurrentUser, Path(id): Path<String>) -> Response {
    save_response(state.session(&user.0).delete_blog_post(&id).await)
}

// Pages and settings

pub async fn save_page(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(name): Path<String>,
    Json(content): Json<Value>,
) -> ApiResult<Response> {
    let page: PageName = name.parse().map_err(|_| api_not_found("Unknown page"))?;
    Ok(save_response(
        state.session(&user.0).save_page(page, &PageContent(content)).await,
    ))
}

pub async fn save_settings(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Response> {
    let settings: SettingsName = name.parse().map_err(|_| api_not_found("Unknown settings"))?;
    let session = state.session(&user.0);

    let result = match settings {
        SettingsName::Website => session.save_website_settings(&decode::<WebsiteSettings>(body)?).await,
        SettingsName::Admin => session.save_admin_settings(&decode::<AdminSettings>(body)?).await,
        SettingsName::Footer => session.save_footer_settings(&decode::<FooterSettings>(body)?).await,
    };
    Ok(save_response(result))
}
