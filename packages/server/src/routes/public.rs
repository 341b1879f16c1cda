//! Public read API and the contact form.

use super::{documents_json, save_response};
use crate::auth::CurrentUser;
use crate::error::{api_bad_request, api_internal, api_not_found, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, Query as QueryParams, State};
use axum::response::Response;
use axum::Json;
use pharmasite_common::path::{BLOGS, PRODUCTS, PRODUCT_CATEGORIES};
use pharmasite_common::{defaults, DocPath, PageName, SettingsName};
use pharmasite_editor::{edit_affordance, resolve_editor_path, ContactForm};
use pharmasite_store::{to_fields, Direction, Document, DocumentStore, Query, StoreClient, StoreResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn client(state: &AppState, user: CurrentUser) -> StoreClient {
    state.store.client(user.0)
}

async fn find_by_slug(client: &StoreClient, collection: &str, slug: &str) -> StoreResult<Option<Document>> {
    let query = Query::collection(collection).where_eq("slug", slug).limit(1);
    Ok(client.query(&query).await?.into_iter().next())
}

pub async fn get_page(State(state): State<AppState>, user: CurrentUser, Path(name): Path<String>) -> ApiResult<Json<Value>> {
    let page: PageName = name.parse().map_err(|_| api_not_found("Unknown page"))?;
    let doc = client(&state, user).get_document(&page.doc_path()).await?;
    doc.map(|d| Json(d.to_json()))
        .ok_or_else(|| api_not_found("Page has no saved content"))
}

/// Settings fall back to their defaults until first saved
pub async fn get_settings(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    let settings: SettingsName = name.parse().map_err(|_| api_not_found("Unknown settings"))?;
    if let Some(doc) = client(&state, user).get_document(&settings.doc_path()).await? {
        return Ok(Json(doc.to_json()));
    }

    let fallback = match settings {
        SettingsName::Website => to_fields(&defaults::website_settings()),
        SettingsName::Admin => to_fields(&defaults::admin_settings()),
        SettingsName::Footer => to_fields(&defaults::footer_settings()),
    }
    .map_err(|e| api_internal("Could not build default settings", &e))?;
    Ok(Json(Value::Object(fallback)))
}

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
}

pub async fn list_products(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(filter): QueryParams<ProductFilter>,
) -> ApiResult<Json<Vec<Value>>> {
    let mut query = Query::collection(PRODUCTS).order_by("name", Direction::Asc);
    if let Some(category) = filter.category.filter(|c| !c.is_empty()) {
        query = query.where_eq("category", category);
    }
    Ok(documents_json(client(&state, user).query(&query).await?))
}

/// `key` is a product id, or its slug when no product has that id
pub async fn get_product(State(state): State<AppState>, user: CurrentUser, Path(key): Path<String>) -> ApiResult<Json<Value>> {
    let client = client(&state, user);
    if let Ok(path) = DocPath::new(PRODUCTS, key.as_str()) {
        if let Some(doc) = client.get_document(&path).await? {
            return Ok(Json(doc.to_json()));
        }
    }

    find_by_slug(&client, PRODUCTS, &key)
        .await?
        .map(|d| Json(d.to_json()))
        .ok_or_else(|| api_not_found("Product not found"))
}

pub async fn list_categories(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<Vec<Value>>> {
    let query = Query::collection(PRODUCT_CATEGORIES).order_by("name", Direction::Asc);
    Ok(documents_json(client(&state, user).query(&query).await?))
}

pub async fn list_posts(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<Vec<Value>>> {
    let query = Query::collection(BLOGS).order_by("date", Direction::Desc);
    Ok(documents_json(client(&state, user).query(&query).await?))
}

pub async fn get_post(State(state): State<AppState>, user: CurrentUser, Path(slug): Path<String>) -> ApiResult<Json<Value>> {
    find_by_slug(&client(&state, user), BLOGS, &slug)
        .await?
        .map(|d| Json(d.to_json()))
        .ok_or_else(|| api_not_found("Post not found"))
}

pub async fn submit_contact(State(state): State<AppState>, user: CurrentUser, Json(form): Json<ContactForm>) -> Response {
    save_response(state.session(&user.0).submit_contact(&form).await)
}

#[derive(Debug, Deserialize)]
pub struct EditPathQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPathResponse {
    pub editor_path: Option<String>,
    /// Whether this viewer should see the edit button
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
}

pub async fn edit_path(user: CurrentUser, QueryParams(query): QueryParams<EditPathQuery>) -> ApiResult<Json<EditPathResponse>> {
    if !query.path.starts_with('/') && !query.path.is_empty() {
        return Err(api_bad_request("path must start with '/'"));
    }

    let affordance = edit_affordance(&query.path, &user.0);
    Ok(Json(EditPathResponse {
        editor_path: resolve_editor_path(&query.path),
        visible: affordance.is_some(),
        label: affordance.map(|a| a.label),
    }))
}
