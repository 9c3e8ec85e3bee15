pub mod admin;
pub mod categories;
pub mod constants;
pub mod health_check;
pub mod posts;

mod error;

pub use error::{ApiError, error_body};

pub use admin::{
    admin_create_post, admin_delete_post, admin_get_post_by_id, admin_get_post_by_slug,
    admin_list_posts, admin_post_stats, admin_update_post,
};
pub use categories::{list_categories, list_posts_by_category};
pub use health_check::health_check;
pub use posts::{get_post_by_slug, list_posts};
