pub mod posts;

pub use posts::{
    admin_create_post, admin_delete_post, admin_get_post_by_id, admin_get_post_by_slug,
    admin_list_posts, admin_post_stats, admin_update_post, CreatePostBody, UpdatePostBody,
};
