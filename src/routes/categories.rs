use crate::domain::{PostQuery, RawPostQuery, SortField};
use crate::routes::ApiError;
use crate::startup::AppState;
use crate::store::{categories, CategoryPosts, CategoryRecord};
use axum::extract::{Path, Query, State};
use axum::response::Json;

/// List active categories
///
/// Categories come back in display order with their published-post counts.
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    responses(
        (status = 200, description = "Active categories", body = Vec<CategoryRecord>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(name = "List categories", skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryRecord>>, ApiError> {
    let categories = categories::list_categories(&state.db).await?;
    Ok(Json(categories))
}

/// List published posts in a category
///
/// Resolves the category slug first: an unknown slug is a 404, a known
/// category with no published posts is an empty page.
#[utoipa::path(
    get,
    path = "/api/categories/{slug}/posts",
    tag = "categories",
    params(
        ("slug" = String, Path, description = "Category slug"),
        RawPostQuery,
    ),
    responses(
        (status = 200, description = "The category and a page of its posts", body = CategoryPosts),
        (status = 400, description = "Invalid listing parameters"),
        (status = 404, description = "No category with this slug"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(name = "List posts by category", skip(state))]
pub async fn list_posts_by_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(raw): Query<RawPostQuery>,
) -> Result<Json<CategoryPosts>, ApiError> {
    let query =
        PostQuery::normalize(raw, SortField::PublishedAt).map_err(ApiError::validation)?;
    let page = categories::list_posts_by_category(&state.db, &slug, &query).await?;
    Ok(Json(page))
}
