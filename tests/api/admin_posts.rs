use crate::helpers::spawn_app;
use serde_json::json;

#[tokio::test]
async fn admin_routes_reject_missing_or_wrong_credentials() {
    let app = spawn_app().await;

    let no_auth = app
        .api_client
        .get(format!("{}/api/admin/posts", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, no_auth.status().as_u16());
    let body: serde_json::Value = no_auth.json().await.unwrap();
    assert_eq!(body["error"]["message"], "Authentication required");

    let wrong_key = app
        .api_client
        .get(format!("{}/api/admin/posts", &app.address))
        .bearer_auth("not-the-key")
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, wrong_key.status().as_u16());
    let body: serde_json::Value = wrong_key.json().await.unwrap();
    assert_eq!(body["error"]["message"], "Authentication failed");
}

#[tokio::test]
async fn admin_listing_sees_every_status() {
    let app = spawn_app().await;
    app.seed_post("visible", "published").await;
    app.seed_post("hidden", "draft").await;
    app.seed_post("gone", "archived").await;

    let response = app.admin_get("/posts").await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 3);

    // And the status filter is honored rather than overridden.
    let drafts = app.admin_get("/posts?status=draft").await;
    let body: serde_json::Value = drafts.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["slug"], "hidden");
}

#[tokio::test]
async fn creating_a_published_post_stamps_published_at() {
    let app = spawn_app().await;

    let response = app
        .admin_create_post(&json!({
            "title": "Async in practice",
            "slug": "async-in-practice",
            "content": "A long enough body about async Rust.",
            "status": "published",
            "tags": ["Rust", "Async"],
        }))
        .await;

    assert_eq!(201, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["slug"], "async-in-practice");
    assert_eq!(body["status"], "published");
    assert!(body["publishedAt"].is_string());
    assert!(body["author"]["username"].is_string());
    let tags = body["tags"].as_array().unwrap();
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0]["slug"], "async");
}

#[tokio::test]
async fn creating_a_draft_leaves_published_at_unset() {
    let app = spawn_app().await;

    let response = app
        .admin_create_post(&json!({
            "title": "Still cooking",
            "slug": "still-cooking",
            "content": "Not ready yet.",
        }))
        .await;

    assert_eq!(201, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "draft");
    assert!(body["publishedAt"].is_null());
}

#[tokio::test]
async fn a_duplicate_slug_is_a_409() {
    let app = spawn_app().await;
    app.seed_post("taken", "published").await;

    let response = app
        .admin_create_post(&json!({
            "title": "Second claim",
            "slug": "taken",
            "content": "This slug is already in use.",
        }))
        .await;

    assert_eq!(409, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn invalid_post_data_is_a_400() {
    let app = spawn_app().await;

    let cases = [
        json!({"title": "", "slug": "ok-slug", "content": "body"}),
        json!({"title": "Fine", "slug": "Not A Slug", "content": "body"}),
        json!({"title": "Fine", "slug": "fine", "content": "   "}),
    ];
    for body in cases {
        let response = app.admin_create_post(&body).await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "{} was not rejected",
            body
        );
    }
}

#[tokio::test]
async fn publishing_an_existing_draft_stamps_published_at_once() {
    let app = spawn_app().await;
    let post_id = app.seed_post("draft-to-publish", "draft").await;

    let response = app
        .admin_update_post(
            post_id,
            &json!({
                "title": "Now live",
                "slug": "draft-to-publish",
                "content": "Ready now.",
                "status": "published",
            }),
        )
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    let first_published_at = body["publishedAt"].as_str().unwrap().to_string();

    // A second published update keeps the original timestamp.
    let response = app
        .admin_update_post(
            post_id,
            &json!({
                "title": "Now live, edited",
                "slug": "draft-to-publish",
                "content": "Ready now, with a fix.",
                "status": "published",
            }),
        )
        .await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["publishedAt"].as_str().unwrap(), first_published_at);
}

#[tokio::test]
async fn updating_a_missing_post_is_a_404() {
    let app = spawn_app().await;

    let response = app
        .admin_update_post(
            999_999,
            &json!({
                "title": "Ghost",
                "slug": "ghost",
                "content": "There is nothing here.",
                "status": "draft",
            }),
        )
        .await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn omitted_associations_are_left_untouched_on_update() {
    let app = spawn_app().await;
    let category_id = app.seed_category("kept", 0).await;
    let post_id = app.seed_post("keeps-categories", "published").await;
    app.attach_category(post_id, category_id).await;

    let response = app
        .admin_update_post(
            post_id,
            &json!({
                "title": "Edited",
                "slug": "keeps-categories",
                "content": "Body edited, associations untouched.",
                "status": "published",
            }),
        )
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["slug"], "kept");
}

#[tokio::test]
async fn deleting_a_post_removes_it_and_its_join_rows() {
    let app = spawn_app().await;
    let category_id = app.seed_category("doomed", 0).await;
    let post_id = app.seed_post("short-lived", "published").await;
    app.attach_category(post_id, category_id).await;

    let response = app.admin_delete_post(post_id).await;
    assert_eq!(204, response.status().as_u16());

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_one(&app.connection_pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
    let orphans: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM post_categories WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&app.connection_pool)
            .await
            .unwrap();
    assert_eq!(orphans, 0);

    let again = app.admin_delete_post(post_id).await;
    assert_eq!(404, again.status().as_u16());
}

#[tokio::test]
async fn admin_get_by_slug_never_counts_a_view() {
    let app = spawn_app().await;
    app.seed_post("quietly-read", "published").await;

    let response = app.admin_get("/posts/slug/quietly-read").await;
    assert_eq!(200, response.status().as_u16());

    let view_count: i64 =
        sqlx::query_scalar("SELECT view_count FROM posts WHERE slug = 'quietly-read'")
            .fetch_one(&app.connection_pool)
            .await
            .unwrap();
    assert_eq!(view_count, 0);
}

#[tokio::test]
async fn stats_count_posts_by_status() {
    let app = spawn_app().await;
    app.seed_post("one", "published").await;
    app.seed_post("two", "published").await;
    app.seed_post("three", "draft").await;
    app.seed_post("four", "archived").await;

    let response = app.admin_get("/posts/stats").await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["total"], 4);
    assert_eq!(body["published"], 2);
    assert_eq!(body["draft"], 1);
    assert_eq!(body["archived"], 1);
    assert_eq!(body["featured"], 0);
}
