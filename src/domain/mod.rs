mod post;
mod post_query;
mod slug;

pub use post::{
    NewPost, PostStatus, PostTitle, PostUpdate, estimate_reading_time, validate_excerpt,
};
pub use post_query::{
    DEFAULT_LIMIT, MAX_LIMIT, MAX_SEARCH_LENGTH, PostQuery, RawPostQuery, SortField, SortOrder,
};
pub use slug::Slug;
