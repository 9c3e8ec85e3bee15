use crate::domain::PostQuery;
use crate::store::filter::PostFilter;
use crate::store::pagination::PageMeta;
use crate::store::projection::PostSummary;
use crate::store::{BlogError, posts};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

/// A category with its published-post count computed from the join table.
/// The count is a view over current state, never a stored counter.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const CATEGORY_SELECT: &str = r#"
SELECT
    c.id, c.name, c.slug, c.description, c.color, c.icon,
    c.sort_order, c.is_active, c.created_at, c.updated_at,
    (
        SELECT COUNT(*)
        FROM post_categories pc
        JOIN posts p ON p.id = pc.post_id
        WHERE pc.category_id = c.id AND p.status = 'published'
    ) AS post_count
FROM categories c
"#;

/// Active categories in display order, for the public category index.
#[tracing::instrument(name = "List categories", skip(pool))]
pub async fn list_categories(pool: &PgPool) -> Result<Vec<CategoryRecord>, BlogError> {
    let categories = sqlx::query_as::<_, CategoryRecord>(&format!(
        "{} WHERE c.is_active ORDER BY c.sort_order, c.id",
        CATEGORY_SELECT
    ))
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

#[tracing::instrument(name = "Fetch category by slug", skip(executor))]
pub async fn get_category_by_slug<'e>(
    executor: impl PgExecutor<'e>,
    slug: &str,
) -> Result<CategoryRecord, BlogError> {
    sqlx::query_as::<_, CategoryRecord>(&format!("{} WHERE c.slug = $1", CATEGORY_SELECT))
        .bind(slug)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| BlogError::not_found(format!("There is no category with slug {}.", slug)))
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CategoryPosts {
    pub category: CategoryRecord,
    pub posts: Vec<PostSummary>,
    pub pagination: PageMeta,
}

/// Posts belonging to a category, public visibility rules applied.
///
/// The slug is resolved first: an unknown category is a `NotFound` outcome,
/// distinct from a known category with zero published posts. The page query
/// reuses the same filter compiler and pagination engine as plain listings,
/// with the category constraint injected and status forced to published.
#[tracing::instrument(name = "List posts by category", skip(pool, query))]
pub async fn list_posts_by_category(
    pool: &PgPool,
    slug: &str,
    query: &PostQuery,
) -> Result<CategoryPosts, BlogError> {
    let mut transaction = pool.begin().await?;
    let category = get_category_by_slug(&mut *transaction, slug).await?;
    let filter = PostFilter {
        category_id: Some(category.id),
        ..PostFilter::from_query(query, true)
    };
    let (posts, pagination) = posts::fetch_post_page(
        &mut transaction,
        &filter,
        query.page,
        query.limit,
        query.sort_by,
        query.sort_order,
    )
    .await?;
    transaction.commit().await?;
    Ok(CategoryPosts {
        category,
        posts,
        pagination,
    })
}
