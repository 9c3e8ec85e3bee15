mod admin_posts;
mod health_check;
mod posts;
