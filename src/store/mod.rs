//! The post query and retrieval core.
//!
//! Operations in this module implement the storage contract consumed by the
//! HTTP layer: listing with filter/sort/pagination, slug and id retrieval,
//! category-scoped retrieval, and the write path (create/update/delete with
//! tag upsert). Nothing here depends on axum types.

pub mod categories;
mod error;
pub mod filter;
pub mod pagination;
mod projection;
pub mod posts;
pub mod tags;

pub use categories::{CategoryPosts, CategoryRecord};
pub use error::BlogError;
pub use pagination::PageMeta;
pub use projection::{
    AuthorProfile, AuthorSummary, CategorySummary, PostDetail, PostSummary, TagSummary,
};
pub use posts::{PostPage, PostStats};
