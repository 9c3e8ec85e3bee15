use crate::domain::{PostQuery, PostStatus};
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

/// A compiled predicate over the post relation.
///
/// Built from a canonical descriptor and appended to count and fetch queries
/// alike, so both sides of the pagination engine always agree on which rows
/// are in scope.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub featured: Option<bool>,
    pub search: Option<String>,
    pub published_after: Option<DateTime<Utc>>,
    pub published_before: Option<DateTime<Utc>>,
    pub category_id: Option<i64>,
    pub tag_slugs: Vec<String>,
}

impl PostFilter {
    /// Compile a descriptor into a predicate.
    ///
    /// `restrict_to_published` is the public/admin divergence made explicit:
    /// public paths force `status = published`, admin paths pass the
    /// descriptor's status through unchanged. On the admin path an absent
    /// status means "no status filter", not "published".
    pub fn from_query(query: &PostQuery, restrict_to_published: bool) -> Self {
        let status = if restrict_to_published {
            Some(PostStatus::Published)
        } else {
            query.status
        };
        Self {
            status,
            featured: query.featured,
            search: query.search.clone(),
            published_after: query.published_after,
            published_before: query.published_before,
            // Category slugs are resolved to an id by the caller.
            category_id: None,
            tag_slugs: query.tags.clone(),
        }
    }

    /// Append the WHERE clause for this filter. Expects the builder to hold a
    /// statement whose post relation is aliased as `p`.
    pub fn push_predicates(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE 1 = 1");
        if let Some(status) = self.status {
            builder
                .push(" AND p.status = ")
                .push_bind(status.as_str().to_string());
        }
        if let Some(featured) = self.featured {
            builder.push(" AND p.featured = ").push_bind(featured);
        }
        if let Some(search) = &self.search {
            let pattern = like_pattern(search);
            builder
                .push(" AND (p.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.content ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR COALESCE(p.excerpt, '') ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(after) = self.published_after {
            builder.push(" AND p.published_at >= ").push_bind(after);
        }
        if let Some(before) = self.published_before {
            builder.push(" AND p.published_at <= ").push_bind(before);
        }
        if let Some(category_id) = self.category_id {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM post_categories pc \
                     WHERE pc.post_id = p.id AND pc.category_id = ",
                )
                .push_bind(category_id)
                .push(")");
        }
        if !self.tag_slugs.is_empty() {
            // OR semantics: a join row for any of the given tags qualifies.
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM post_tags pt \
                     JOIN tags t ON t.id = pt.tag_id \
                     WHERE pt.post_id = p.id AND t.slug = ANY(",
                )
                .push_bind(self.tag_slugs.clone())
                .push("))");
        }
    }
}

/// Wrap a search term in `%` wildcards, escaping LIKE metacharacters so user
/// input always matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
