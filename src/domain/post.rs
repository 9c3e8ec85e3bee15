use crate::domain::Slug;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Result<PostStatus, String> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "archived" => Ok(PostStatus::Archived),
            other => Err(format!("{} is not a valid post status.", other)),
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostTitle(String);

impl PostTitle {
    /// Returns an instance of `PostTitle` if the input satisfies all
    /// our validation constraints on post titles.
    /// It returns an error message otherwise.
    pub fn parse(s: String) -> Result<PostTitle, String> {
        let is_empty_or_whitespace = s.trim().is_empty();
        // A grapheme is defined by the Unicode standard as a "user-perceived"
        // character: `å` is a single grapheme, but it is composed of two
        // characters (`a` and `̊`).
        let is_too_long = s.graphemes(true).count() > 255;

        if is_empty_or_whitespace || is_too_long {
            Err(format!("{} is not a valid post title.", s))
        } else {
            Ok(Self(s))
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for PostTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated input for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: PostTitle,
    pub slug: Slug,
    pub content: String,
    pub excerpt: Option<String>,
    pub status: PostStatus,
    pub featured: bool,
    pub category_ids: Vec<i64>,
    /// Tag names, resolved (or created) by slug at write time.
    pub tags: Vec<String>,
}

/// Validated input for updating a post.
///
/// `featured`, `category_ids` and `tags` are optional: `None` leaves the
/// stored value (or association set) untouched.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub title: PostTitle,
    pub slug: Slug,
    pub content: String,
    pub excerpt: Option<String>,
    pub status: PostStatus,
    pub featured: Option<bool>,
    pub category_ids: Option<Vec<i64>>,
    pub tags: Option<Vec<String>>,
}

/// Estimated reading time in minutes, assuming ~200 words per minute.
/// Always at least one minute for non-empty content.
pub fn estimate_reading_time(content: &str) -> i32 {
    let words = content.split_whitespace().count();
    ((words + 199) / 200).max(1) as i32
}

pub fn validate_excerpt(excerpt: Option<String>) -> Result<Option<String>, String> {
    match excerpt {
        None => Ok(None),
        Some(e) if e.trim().is_empty() => Ok(None),
        Some(e) if e.chars().count() > 500 => {
            Err("The excerpt must not exceed 500 characters.".to_string())
        }
        Some(e) => Ok(Some(e)),
    }
}
