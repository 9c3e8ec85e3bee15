use crate::store::BlogError;
use sqlx::{Postgres, Transaction};
use std::collections::HashSet;

/// Derive a tag slug from a display name: lowercase, with runs of
/// non-alphanumeric characters collapsed to single hyphens.
pub fn slugify_tag(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Resolve tag names to ids, creating missing tags on the way.
///
/// Concurrent creation of the same new tag name is handled by the unique
/// constraint on `tags.slug`: `ON CONFLICT DO NOTHING` followed by a re-read
/// always lands on a single winner row. Names that slugify to the same value
/// are deduplicated, preserving first occurrence order.
#[tracing::instrument(name = "Resolve or create tags", skip(transaction))]
pub async fn resolve_or_create_tags(
    transaction: &mut Transaction<'_, Postgres>,
    names: &[String],
) -> Result<Vec<i64>, BlogError> {
    let mut ids = Vec::with_capacity(names.len());
    let mut seen = HashSet::new();
    for name in names {
        let slug = slugify_tag(name);
        if slug.is_empty() || !seen.insert(slug.clone()) {
            continue;
        }
        sqlx::query("INSERT INTO tags (name, slug) VALUES ($1, $2) ON CONFLICT (slug) DO NOTHING")
            .bind(name.trim())
            .bind(&slug)
            .execute(&mut **transaction)
            .await?;
        let id: i64 = sqlx::query_scalar("SELECT id FROM tags WHERE slug = $1")
            .bind(&slug)
            .fetch_one(&mut **transaction)
            .await?;
        ids.push(id);
    }
    Ok(ids)
}
