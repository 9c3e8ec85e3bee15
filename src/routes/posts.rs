use crate::domain::{PostQuery, RawPostQuery, SortField};
use crate::routes::ApiError;
use crate::startup::AppState;
use crate::store::posts::{self, PostPage};
use crate::store::PostDetail;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Deserialize;

/// List published blog posts
///
/// Supports filtering (featured, category, tags, search, date bounds),
/// sorting and pagination. Only published posts are visible here.
#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(RawPostQuery),
    responses(
        (status = 200, description = "A page of published posts", body = PostPage),
        (status = 400, description = "Invalid listing parameters"),
        (status = 404, description = "Unknown category"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(name = "List published posts", skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(raw): Query<RawPostQuery>,
) -> Result<Json<PostPage>, ApiError> {
    let query =
        PostQuery::normalize(raw, SortField::PublishedAt).map_err(ApiError::validation)?;
    let page = posts::list_posts(&state.db, &query, true).await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct DetailParams {
    /// Set to `false` to read the post without counting a view
    /// (prefetching, previews).
    pub view: Option<String>,
}

/// Get a blog post by slug
///
/// Reading a published post counts a view unless `?view=false` is given; the
/// response carries the post-increment count.
#[utoipa::path(
    get,
    path = "/api/posts/{slug}",
    tag = "posts",
    params(
        ("slug" = String, Path, description = "Post slug"),
        ("view" = Option<String>, Query, description = "Pass false to skip the view count"),
    ),
    responses(
        (status = 200, description = "The post", body = PostDetail),
        (status = 404, description = "No post with this slug"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(name = "Get post by slug", skip(state))]
pub async fn get_post_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<DetailParams>,
) -> Result<Json<PostDetail>, ApiError> {
    let increment_view = params.view.as_deref() != Some("false");
    let post = posts::get_post_by_slug(&state.db, &slug, increment_view).await?;
    Ok(Json(post))
}
