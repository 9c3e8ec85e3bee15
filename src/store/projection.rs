use crate::domain::PostStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A raw joined row: post columns, the (optional) author's profile columns
/// and a comment count. Categories and tags are loaded separately per page
/// and attached during projection.
#[derive(Debug, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub status: String,
    pub featured: bool,
    pub view_count: i64,
    pub like_count: i64,
    pub reading_time: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: Option<i64>,
    pub author_username: Option<String>,
    pub author_display_name: Option<String>,
    pub author_avatar_url: Option<String>,
    pub author_bio: Option<String>,
    pub author_website: Option<String>,
    pub author_github_username: Option<String>,
    pub author_twitter_username: Option<String>,
    pub comment_count: i64,
}

impl PostRow {
    fn status(&self) -> PostStatus {
        PostStatus::parse(&self.status).unwrap_or(PostStatus::Draft)
    }

    /// An orphaned post (author deleted or never set) projects `author: null`.
    fn author_summary(&self) -> Option<AuthorSummary> {
        match (self.author_id, &self.author_username) {
            (Some(id), Some(username)) => Some(AuthorSummary {
                id,
                username: username.clone(),
                display_name: self.author_display_name.clone(),
                avatar_url: self.author_avatar_url.clone(),
            }),
            _ => None,
        }
    }

    fn author_profile(&self) -> Option<AuthorProfile> {
        match (self.author_id, &self.author_username) {
            (Some(id), Some(username)) => Some(AuthorProfile {
                id,
                username: username.clone(),
                display_name: self.author_display_name.clone(),
                avatar_url: self.author_avatar_url.clone(),
                bio: self.author_bio.clone(),
                website: self.author_website.clone(),
                github_username: self.author_github_username.clone(),
                twitter_username: self.author_twitter_username.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProfile {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub github_username: Option<String>,
    pub twitter_username: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// The list-context shape: no content body, author as a short summary.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub status: PostStatus,
    pub featured: bool,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub reading_time: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: Option<AuthorSummary>,
    pub categories: Vec<CategorySummary>,
    pub tags: Vec<TagSummary>,
}

/// The detail-context shape: full content and the extended author profile.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub status: PostStatus,
    pub featured: bool,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub reading_time: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: Option<AuthorProfile>,
    pub categories: Vec<CategorySummary>,
    pub tags: Vec<TagSummary>,
}

pub fn project_summary(
    row: PostRow,
    categories: Vec<CategorySummary>,
    tags: Vec<TagSummary>,
) -> PostSummary {
    PostSummary {
        status: row.status(),
        author: row.author_summary(),
        id: row.id,
        title: row.title,
        slug: row.slug,
        excerpt: row.excerpt,
        featured: row.featured,
        view_count: row.view_count,
        like_count: row.like_count,
        comment_count: row.comment_count,
        reading_time: row.reading_time,
        published_at: row.published_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
        categories,
        tags,
    }
}

pub fn project_detail(
    row: PostRow,
    categories: Vec<CategorySummary>,
    tags: Vec<TagSummary>,
) -> PostDetail {
    PostDetail {
        status: row.status(),
        author: row.author_profile(),
        id: row.id,
        title: row.title,
        slug: row.slug,
        content: row.content,
        excerpt: row.excerpt,
        featured: row.featured,
        view_count: row.view_count,
        like_count: row.like_count,
        comment_count: row.comment_count,
        reading_time: row.reading_time,
        published_at: row.published_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
        categories,
        tags,
    }
}
