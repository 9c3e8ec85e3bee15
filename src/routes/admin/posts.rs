use crate::authentication::UserId;
use crate::domain::{
    NewPost, PostQuery, PostStatus, PostTitle, PostUpdate, RawPostQuery, Slug, SortField,
    validate_excerpt,
};
use crate::routes::ApiError;
use crate::startup::AppState;
use crate::store::posts::{self, PostPage, PostStats};
use crate::store::PostDetail;
use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

/// Request body for creating a post.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostBody {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    /// Defaults to `draft` when absent.
    pub status: Option<PostStatus>,
    /// Defaults to `false` when absent.
    pub featured: Option<bool>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    /// Tag names; missing tags are created on the way.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TryFrom<CreatePostBody> for NewPost {
    type Error = String;

    fn try_from(body: CreatePostBody) -> Result<Self, Self::Error> {
        let title = PostTitle::parse(body.title)?;
        let slug = Slug::parse(body.slug)?;
        if body.content.trim().is_empty() {
            return Err("The post content must not be empty.".to_string());
        }
        let excerpt = validate_excerpt(body.excerpt)?;
        Ok(NewPost {
            title,
            slug,
            content: body.content,
            excerpt,
            status: body.status.unwrap_or(PostStatus::Draft),
            featured: body.featured.unwrap_or(false),
            category_ids: body.category_ids,
            tags: body.tags,
        })
    }
}

/// Request body for updating a post.
///
/// Core fields are replaced wholesale; `featured`, `categoryIds` and `tags`
/// are optional and, when absent, leave the stored values untouched.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostBody {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub status: PostStatus,
    pub featured: Option<bool>,
    pub category_ids: Option<Vec<i64>>,
    pub tags: Option<Vec<String>>,
}

impl TryFrom<UpdatePostBody> for PostUpdate {
    type Error = String;

    fn try_from(body: UpdatePostBody) -> Result<Self, Self::Error> {
        let title = PostTitle::parse(body.title)?;
        let slug = Slug::parse(body.slug)?;
        if body.content.trim().is_empty() {
            return Err("The post content must not be empty.".to_string());
        }
        let excerpt = validate_excerpt(body.excerpt)?;
        Ok(PostUpdate {
            title,
            slug,
            content: body.content,
            excerpt,
            status: body.status,
            featured: body.featured,
            category_ids: body.category_ids,
            tags: body.tags,
        })
    }
}

/// Admin: List all blog posts
///
/// Unlike the public listing, every status is visible and the status filter
/// is honored. Default sort is by last update. Requires authentication.
#[utoipa::path(
    get,
    path = "/api/admin/posts",
    tag = "admin-posts",
    params(RawPostQuery),
    responses(
        (status = 200, description = "A page of posts across all statuses", body = PostPage),
        (status = 400, description = "Invalid listing parameters"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(name = "Admin: List posts", skip(state))]
pub async fn admin_list_posts(
    State(state): State<AppState>,
    Extension(_user_id): Extension<UserId>,
    Query(raw): Query<RawPostQuery>,
) -> Result<Json<PostPage>, ApiError> {
    let query = PostQuery::normalize(raw, SortField::UpdatedAt).map_err(ApiError::validation)?;
    let page = posts::list_posts(&state.db, &query, false).await?;
    Ok(Json(page))
}

/// Admin: Get a blog post by id
///
/// Returns the post regardless of status. Never counts a view.
/// Requires authentication.
#[utoipa::path(
    get,
    path = "/api/admin/posts/{id}",
    tag = "admin-posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "The post", body = PostDetail),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No post with this id"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(name = "Admin: Get post by id", skip(state))]
pub async fn admin_get_post_by_id(
    State(state): State<AppState>,
    Extension(_user_id): Extension<UserId>,
    Path(post_id): Path<i64>,
) -> Result<Json<PostDetail>, ApiError> {
    let post = posts::get_post_by_id(&state.db, post_id).await?;
    Ok(Json(post))
}

/// Admin: Get a blog post by slug
///
/// Returns the post regardless of status. Never counts a view.
/// Requires authentication.
#[utoipa::path(
    get,
    path = "/api/admin/posts/slug/{slug}",
    tag = "admin-posts",
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    responses(
        (status = 200, description = "The post", body = PostDetail),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No post with this slug"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(name = "Admin: Get post by slug", skip(state))]
pub async fn admin_get_post_by_slug(
    State(state): State<AppState>,
    Extension(_user_id): Extension<UserId>,
    Path(slug): Path<String>,
) -> Result<Json<PostDetail>, ApiError> {
    let post = posts::get_post_by_slug(&state.db, &slug, false).await?;
    Ok(Json(post))
}

/// Admin: Create a blog post
///
/// Creates the post with its category and tag associations; a publishing
/// create stamps `publishedAt`. Requires authentication.
#[utoipa::path(
    post,
    path = "/api/admin/posts",
    tag = "admin-posts",
    request_body = CreatePostBody,
    responses(
        (status = 201, description = "Post created", body = PostDetail),
        (status = 400, description = "Invalid post data"),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "A post with this slug already exists"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(name = "Admin: Create post", skip(state, body))]
pub async fn admin_create_post(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(body): Json<CreatePostBody>,
) -> Result<impl IntoResponse, ApiError> {
    let new_post: NewPost = body.try_into().map_err(ApiError::validation)?;
    let post = posts::insert_post(&state.db, &new_post, user_id.0).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Admin: Update a blog post
///
/// Replaces the post's core fields; a draft-to-published transition stamps
/// `publishedAt`. Requires authentication.
#[utoipa::path(
    put,
    path = "/api/admin/posts/{id}",
    tag = "admin-posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostBody,
    responses(
        (status = 200, description = "Post updated", body = PostDetail),
        (status = 400, description = "Invalid post data"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No post with this id"),
        (status = 409, description = "A post with this slug already exists"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(name = "Admin: Update post", skip(state, body))]
pub async fn admin_update_post(
    State(state): State<AppState>,
    Extension(_user_id): Extension<UserId>,
    Path(post_id): Path<i64>,
    Json(body): Json<UpdatePostBody>,
) -> Result<Json<PostDetail>, ApiError> {
    let update: PostUpdate = body.try_into().map_err(ApiError::validation)?;
    let post = posts::update_post(&state.db, post_id, &update).await?;
    Ok(Json(post))
}

/// Admin: Delete a blog post
///
/// Association rows go with the post. Requires authentication.
#[utoipa::path(
    delete,
    path = "/api/admin/posts/{id}",
    tag = "admin-posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No post with this id"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(name = "Admin: Delete post", skip(state))]
pub async fn admin_delete_post(
    State(state): State<AppState>,
    Extension(_user_id): Extension<UserId>,
    Path(post_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    posts::delete_post(&state.db, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Admin: Post counts by status
///
/// Requires authentication.
#[utoipa::path(
    get,
    path = "/api/admin/posts/stats",
    tag = "admin-posts",
    responses(
        (status = 200, description = "Aggregate post counts", body = PostStats),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(name = "Admin: Post stats", skip(state))]
pub async fn admin_post_stats(
    State(state): State<AppState>,
    Extension(_user_id): Extension<UserId>,
) -> Result<Json<PostStats>, ApiError> {
    let stats = posts::post_stats(&state.db).await?;
    Ok(Json(stats))
}
