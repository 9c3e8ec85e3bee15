use crate::domain::PostStatus;
use chrono::{DateTime, Utc};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 50;
pub const MAX_SEARCH_LENGTH: usize = 100;

/// Raw, untyped listing parameters as they arrive on the wire.
///
/// Everything is an optional string: coercion and bounds checking happen in
/// [`PostQuery::normalize`], so a bad `page=abc` surfaces as a validation
/// error rather than a framework-level rejection.
#[derive(Debug, Clone, Default, serde::Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct RawPostQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub featured: Option<String>,
    pub category: Option<String>,
    /// Comma-separated tag slugs.
    pub tags: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub published_after: Option<String>,
    pub published_before: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    PublishedAt,
    Title,
    ViewCount,
}

impl SortField {
    pub fn parse(s: &str) -> Result<SortField, String> {
        match s {
            "createdAt" => Ok(SortField::CreatedAt),
            "updatedAt" => Ok(SortField::UpdatedAt),
            "publishedAt" => Ok(SortField::PublishedAt),
            "title" => Ok(SortField::Title),
            "viewCount" => Ok(SortField::ViewCount),
            other => Err(format!("{} is not a valid sort field.", other)),
        }
    }

    /// The column this field sorts on. Sort fields are a closed set, so the
    /// returned name can be spliced into SQL directly.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::PublishedAt => "published_at",
            SortField::Title => "title",
            SortField::ViewCount => "view_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Result<SortOrder, String> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("{} is not a valid sort order.", other)),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// The canonical, bounded listing descriptor.
///
/// Downstream components (filter compilation, pagination) assume a
/// well-formed descriptor; all coercion lives here.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub page: u32,
    pub limit: u32,
    pub status: Option<PostStatus>,
    pub featured: Option<bool>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub search: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub published_after: Option<DateTime<Utc>>,
    pub published_before: Option<DateTime<Utc>>,
}

impl PostQuery {
    /// Coerce raw parameters into a canonical descriptor.
    ///
    /// `default_sort` differs per call site: public listings sort by
    /// `publishedAt`, admin listings by `updatedAt`.
    pub fn normalize(raw: RawPostQuery, default_sort: SortField) -> Result<PostQuery, String> {
        let page = match raw.page.as_deref() {
            None => 1,
            Some(s) => {
                let page: u32 = s
                    .parse()
                    .map_err(|_| format!("{} is not a valid page number.", s))?;
                if page < 1 {
                    return Err("The page number must be at least 1.".to_string());
                }
                page
            }
        };

        let limit = match raw.limit.as_deref() {
            None => DEFAULT_LIMIT,
            Some(s) => {
                let limit: u32 = s
                    .parse()
                    .map_err(|_| format!("{} is not a valid page size.", s))?;
                limit.clamp(1, MAX_LIMIT)
            }
        };

        let status = raw
            .status
            .as_deref()
            .map(PostStatus::parse)
            .transpose()?;

        let featured = match raw.featured.as_deref() {
            None => None,
            Some("true") | Some("1") => Some(true),
            Some("false") | Some("0") => Some(false),
            Some(other) => return Err(format!("{} is not a valid featured flag.", other)),
        };

        let search = match raw.search {
            None => None,
            Some(s) => {
                let trimmed = s.trim().to_string();
                if trimmed.is_empty() {
                    None
                } else if trimmed.chars().count() > MAX_SEARCH_LENGTH {
                    return Err(format!(
                        "The search term must not exceed {} characters.",
                        MAX_SEARCH_LENGTH
                    ));
                } else {
                    Some(trimmed)
                }
            }
        };

        let tags = raw
            .tags
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let sort_by = match raw.sort_by.as_deref() {
            None => default_sort,
            Some(s) => SortField::parse(s)?,
        };
        let sort_order = match raw.sort_order.as_deref() {
            None => SortOrder::Desc,
            Some(s) => SortOrder::parse(s)?,
        };

        let published_after = raw
            .published_after
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;
        let published_before = raw
            .published_before
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;

        Ok(PostQuery {
            page,
            limit,
            status,
            featured,
            category: raw.category.filter(|c| !c.trim().is_empty()),
            tags,
            search,
            sort_by,
            sort_order,
            published_after,
            published_before,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("{} is not a valid RFC 3339 timestamp.", s))
}
