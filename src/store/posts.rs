use crate::domain::{NewPost, PostQuery, PostStatus, PostUpdate, SortField, SortOrder, estimate_reading_time};
use crate::store::filter::PostFilter;
use crate::store::pagination::{self, PageMeta};
use crate::store::projection::{
    CategorySummary, PostDetail, PostRow, PostSummary, TagSummary, project_detail, project_summary,
};
use crate::store::{BlogError, categories, tags};
use chrono::Utc;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use std::collections::HashMap;

const POST_SELECT: &str = r#"
SELECT
    p.id, p.title, p.slug, p.content, p.excerpt, p.status, p.featured,
    p.view_count, p.like_count, p.reading_time, p.published_at,
    p.created_at, p.updated_at, p.author_id,
    u.username AS author_username,
    u.display_name AS author_display_name,
    u.avatar_url AS author_avatar_url,
    u.bio AS author_bio,
    u.website AS author_website,
    u.github_username AS author_github_username,
    u.twitter_username AS author_twitter_username,
    (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
FROM posts p
LEFT JOIN users u ON u.id = p.author_id
"#;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PostPage {
    pub items: Vec<PostSummary>,
    pub pagination: PageMeta,
}

/// List posts matching a canonical descriptor.
///
/// `restrict_to_published` selects between the public path (status forced to
/// published) and the admin path (descriptor status passed through, absence
/// meaning "everything"). Count, windowed fetch and association loading run
/// in one transaction so the page and its total never disagree.
#[tracing::instrument(name = "List posts", skip(pool, query))]
pub async fn list_posts(
    pool: &PgPool,
    query: &PostQuery,
    restrict_to_published: bool,
) -> Result<PostPage, BlogError> {
    let mut transaction = pool.begin().await?;
    let mut filter = PostFilter::from_query(query, restrict_to_published);
    if let Some(category_slug) = &query.category {
        let category = categories::get_category_by_slug(&mut *transaction, category_slug).await?;
        filter.category_id = Some(category.id);
    }
    let (items, pagination) = fetch_post_page(
        &mut transaction,
        &filter,
        query.page,
        query.limit,
        query.sort_by,
        query.sort_order,
    )
    .await?;
    transaction.commit().await?;
    Ok(PostPage { items, pagination })
}

/// Count + windowed fetch for a compiled predicate.
///
/// The ordering always appends `p.id` with the same direction as the primary
/// key so pagination stays stable when primary sort values tie.
pub(crate) async fn fetch_post_page(
    transaction: &mut Transaction<'_, Postgres>,
    filter: &PostFilter,
    page: u32,
    limit: u32,
    sort_by: SortField,
    sort_order: SortOrder,
) -> Result<(Vec<PostSummary>, PageMeta), BlogError> {
    let mut count_builder: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM posts p");
    filter.push_predicates(&mut count_builder);
    let total: i64 = count_builder
        .build_query_scalar()
        .fetch_one(&mut **transaction)
        .await?;

    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(POST_SELECT);
    filter.push_predicates(&mut builder);
    builder.push(format!(
        " ORDER BY p.{} {}, p.id {}",
        sort_by.column(),
        sort_order.as_sql(),
        sort_order.as_sql()
    ));
    builder
        .push(" LIMIT ")
        .push_bind(limit as i64)
        .push(" OFFSET ")
        .push_bind(pagination::offset(page, limit));
    let rows: Vec<PostRow> = builder
        .build_query_as()
        .fetch_all(&mut **transaction)
        .await?;

    let post_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let (mut categories_by_post, mut tags_by_post) =
        load_associations(transaction, &post_ids).await?;
    let items = rows
        .into_iter()
        .map(|row| {
            let categories = categories_by_post.remove(&row.id).unwrap_or_default();
            let tags = tags_by_post.remove(&row.id).unwrap_or_default();
            project_summary(row, categories, tags)
        })
        .collect();
    Ok((items, PageMeta::new(page, limit, total as u64)))
}

#[derive(sqlx::FromRow)]
struct CategoryJoinRow {
    post_id: i64,
    id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    color: String,
    icon: Option<String>,
}

#[derive(sqlx::FromRow)]
struct TagJoinRow {
    post_id: i64,
    id: i64,
    name: String,
    slug: String,
}

/// Batch-load category and tag associations for a page of posts.
async fn load_associations(
    transaction: &mut Transaction<'_, Postgres>,
    post_ids: &[i64],
) -> Result<
    (
        HashMap<i64, Vec<CategorySummary>>,
        HashMap<i64, Vec<TagSummary>>,
    ),
    BlogError,
> {
    let mut categories_by_post: HashMap<i64, Vec<CategorySummary>> = HashMap::new();
    let mut tags_by_post: HashMap<i64, Vec<TagSummary>> = HashMap::new();
    if post_ids.is_empty() {
        return Ok((categories_by_post, tags_by_post));
    }

    let category_rows: Vec<CategoryJoinRow> = sqlx::query_as(
        r#"
        SELECT pc.post_id, c.id, c.name, c.slug, c.description, c.color, c.icon
        FROM post_categories pc
        JOIN categories c ON c.id = pc.category_id
        WHERE pc.post_id = ANY($1)
        ORDER BY c.sort_order, c.id
        "#,
    )
    .bind(post_ids)
    .fetch_all(&mut **transaction)
    .await?;
    for row in category_rows {
        categories_by_post
            .entry(row.post_id)
            .or_default()
            .push(CategorySummary {
                id: row.id,
                name: row.name,
                slug: row.slug,
                description: row.description,
                color: row.color,
                icon: row.icon,
            });
    }

    let tag_rows: Vec<TagJoinRow> = sqlx::query_as(
        r#"
        SELECT pt.post_id, t.id, t.name, t.slug
        FROM post_tags pt
        JOIN tags t ON t.id = pt.tag_id
        WHERE pt.post_id = ANY($1)
        ORDER BY t.name, t.id
        "#,
    )
    .bind(post_ids)
    .fetch_all(&mut **transaction)
    .await?;
    for row in tag_rows {
        tags_by_post.entry(row.post_id).or_default().push(TagSummary {
            id: row.id,
            name: row.name,
            slug: row.slug,
        });
    }

    Ok((categories_by_post, tags_by_post))
}

/// Fetch a single post by slug, optionally counting the view.
///
/// The increment applies only to published posts and happens atomically in
/// the database, so concurrent detail requests never lose updates. The
/// returned detail carries the post-increment count: the response describes
/// "this view", not the state before it.
#[tracing::instrument(name = "Fetch post by slug", skip(pool))]
pub async fn get_post_by_slug(
    pool: &PgPool,
    slug: &str,
    increment_view: bool,
) -> Result<PostDetail, BlogError> {
    let mut transaction = pool.begin().await?;
    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(POST_SELECT);
    builder.push(" WHERE p.slug = ").push_bind(slug.to_string());
    let row: Option<PostRow> = builder
        .build_query_as()
        .fetch_optional(&mut *transaction)
        .await?;
    let Some(mut row) = row else {
        return Err(BlogError::not_found(format!(
            "There is no post with slug {}.",
            slug
        )));
    };

    if increment_view && row.status == PostStatus::Published.as_str() {
        let view_count: i64 = sqlx::query_scalar(
            "UPDATE posts SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        )
        .bind(row.id)
        .fetch_one(&mut *transaction)
        .await?;
        row.view_count = view_count;
    }

    let post_id = row.id;
    let (mut categories_by_post, mut tags_by_post) =
        load_associations(&mut transaction, &[post_id]).await?;
    transaction.commit().await?;
    Ok(project_detail(
        row,
        categories_by_post.remove(&post_id).unwrap_or_default(),
        tags_by_post.remove(&post_id).unwrap_or_default(),
    ))
}

/// Fetch a single post by id. Used by privileged/editing paths; never
/// touches the view counter.
#[tracing::instrument(name = "Fetch post by id", skip(pool))]
pub async fn get_post_by_id(pool: &PgPool, post_id: i64) -> Result<PostDetail, BlogError> {
    let mut transaction = pool.begin().await?;
    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(POST_SELECT);
    builder.push(" WHERE p.id = ").push_bind(post_id);
    let row: Option<PostRow> = builder
        .build_query_as()
        .fetch_optional(&mut *transaction)
        .await?;
    let Some(row) = row else {
        return Err(BlogError::not_found(format!(
            "There is no post with id {}.",
            post_id
        )));
    };
    let (mut categories_by_post, mut tags_by_post) =
        load_associations(&mut transaction, &[post_id]).await?;
    transaction.commit().await?;
    Ok(project_detail(
        row,
        categories_by_post.remove(&post_id).unwrap_or_default(),
        tags_by_post.remove(&post_id).unwrap_or_default(),
    ))
}

/// Create a post together with its category and tag associations.
///
/// The whole write is one transaction: a slug collision or an unknown
/// category id rolls everything back, leaving no partial row behind.
#[tracing::instrument(name = "Insert post", skip(pool, new_post))]
pub async fn insert_post(
    pool: &PgPool,
    new_post: &NewPost,
    author_id: i64,
) -> Result<PostDetail, BlogError> {
    let mut transaction = pool.begin().await?;
    let tag_ids = tags::resolve_or_create_tags(&mut transaction, &new_post.tags).await?;
    let published_at = (new_post.status == PostStatus::Published).then(Utc::now);
    let reading_time = estimate_reading_time(&new_post.content);

    let post_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO posts
            (slug, title, content, excerpt, status, featured, reading_time,
             author_id, published_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(new_post.slug.as_ref())
    .bind(new_post.title.as_ref())
    .bind(&new_post.content)
    .bind(&new_post.excerpt)
    .bind(new_post.status.as_str())
    .bind(new_post.featured)
    .bind(reading_time)
    .bind(author_id)
    .bind(published_at)
    .fetch_one(&mut *transaction)
    .await
    .map_err(|e| {
        BlogError::from_write_error(
            e,
            format!("A post with slug {} already exists.", new_post.slug),
        )
    })?;

    replace_category_rows(&mut transaction, post_id, &new_post.category_ids).await?;
    replace_tag_rows(&mut transaction, post_id, &tag_ids).await?;
    transaction.commit().await?;

    get_post_by_id(pool, post_id).await
}

/// Update a post. Associations are replaced only when the update names them;
/// `None` leaves the stored set untouched. Transitioning into the published
/// status stamps `published_at`.
#[tracing::instrument(name = "Update post", skip(pool, update))]
pub async fn update_post(
    pool: &PgPool,
    post_id: i64,
    update: &PostUpdate,
) -> Result<PostDetail, BlogError> {
    let mut transaction = pool.begin().await?;
    let current_status: Option<String> =
        sqlx::query_scalar("SELECT status FROM posts WHERE id = $1 FOR UPDATE")
            .bind(post_id)
            .fetch_optional(&mut *transaction)
            .await?;
    let Some(current_status) = current_status else {
        return Err(BlogError::not_found(format!(
            "There is no post with id {}.",
            post_id
        )));
    };
    let becomes_published = update.status == PostStatus::Published
        && current_status != PostStatus::Published.as_str();
    let reading_time = estimate_reading_time(&update.content);

    sqlx::query(
        r#"
        UPDATE posts
        SET slug = $2,
            title = $3,
            content = $4,
            excerpt = $5,
            status = $6,
            featured = COALESCE($7, featured),
            reading_time = $8,
            published_at = CASE WHEN $9 THEN NOW() ELSE published_at END,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .bind(update.slug.as_ref())
    .bind(update.title.as_ref())
    .bind(&update.content)
    .bind(&update.excerpt)
    .bind(update.status.as_str())
    .bind(update.featured)
    .bind(reading_time)
    .bind(becomes_published)
    .execute(&mut *transaction)
    .await
    .map_err(|e| {
        BlogError::from_write_error(
            e,
            format!("A post with slug {} already exists.", update.slug),
        )
    })?;

    if let Some(category_ids) = &update.category_ids {
        sqlx::query("DELETE FROM post_categories WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *transaction)
            .await?;
        replace_category_rows(&mut transaction, post_id, category_ids).await?;
    }
    if let Some(tag_names) = &update.tags {
        let tag_ids = tags::resolve_or_create_tags(&mut transaction, tag_names).await?;
        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *transaction)
            .await?;
        replace_tag_rows(&mut transaction, post_id, &tag_ids).await?;
    }
    transaction.commit().await?;

    get_post_by_id(pool, post_id).await
}

/// Delete a post. Join rows go with it via `ON DELETE CASCADE`.
#[tracing::instrument(name = "Delete post", skip(pool))]
pub async fn delete_post(pool: &PgPool, post_id: i64) -> Result<(), BlogError> {
    let deleted: Option<i64> = sqlx::query_scalar("DELETE FROM posts WHERE id = $1 RETURNING id")
        .bind(post_id)
        .fetch_optional(pool)
        .await?;
    match deleted {
        Some(_) => Ok(()),
        None => Err(BlogError::not_found(format!(
            "There is no post with id {}.",
            post_id
        ))),
    }
}

async fn replace_category_rows(
    transaction: &mut Transaction<'_, Postgres>,
    post_id: i64,
    category_ids: &[i64],
) -> Result<(), BlogError> {
    for &category_id in category_ids {
        sqlx::query(
            "INSERT INTO post_categories (post_id, category_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(category_id)
        .execute(&mut **transaction)
        .await
        .map_err(|e| BlogError::from_write_error(e, "Duplicate category association."))?;
    }
    Ok(())
}

async fn replace_tag_rows(
    transaction: &mut Transaction<'_, Postgres>,
    post_id: i64,
    tag_ids: &[i64],
) -> Result<(), BlogError> {
    for &tag_id in tag_ids {
        sqlx::query(
            "INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(tag_id)
        .execute(&mut **transaction)
        .await?;
    }
    Ok(())
}

/// Aggregate post counts for the admin dashboard.
#[derive(Debug, Serialize, utoipa::ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PostStats {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
    pub archived: i64,
    pub featured: i64,
}

#[tracing::instrument(name = "Fetch post stats", skip(pool))]
pub async fn post_stats(pool: &PgPool) -> Result<PostStats, BlogError> {
    let stats = sqlx::query_as::<_, PostStats>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE status = 'published') AS published,
            COUNT(*) FILTER (WHERE status = 'draft') AS draft,
            COUNT(*) FILTER (WHERE status = 'archived') AS archived,
            COUNT(*) FILTER (WHERE featured) AS featured
        FROM posts
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(stats)
}
