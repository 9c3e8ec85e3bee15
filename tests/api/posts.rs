use crate::helpers::spawn_app;
use chrono::{DateTime, Duration, Utc};

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

#[tokio::test]
async fn listing_returns_only_published_posts() {
    let app = spawn_app().await;
    app.seed_post("published-one", "published").await;
    app.seed_post("draft-one", "draft").await;
    app.seed_post("archived-one", "archived").await;

    let response = app.get_posts("").await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["slug"], "published-one");
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn listing_is_paginated_with_stable_ordering() {
    let app = spawn_app().await;
    let start = Utc::now() - Duration::days(30);
    for i in 0..15 {
        app.seed_post_published_at(
            &format!("post-{:02}", i),
            "published",
            start + Duration::days(i),
        )
        .await;
    }

    let first_page = app.get_posts("?limit=10").await;
    let body: serde_json::Value = first_page.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 10);
    assert_eq!(body["pagination"]["total"], 15);
    assert_eq!(body["pagination"]["totalPages"], 2);
    // Default order is most recently published first.
    assert_eq!(body["items"][0]["slug"], "post-14");

    let second_page = app.get_posts("?limit=10&page=2").await;
    let body: serde_json::Value = second_page.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[4]["slug"], "post-00");
}

#[tokio::test]
async fn a_page_beyond_the_last_is_empty_not_an_error() {
    let app = spawn_app().await;
    app.seed_post("only-one", "published").await;

    let response = app.get_posts("?page=99").await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn an_invalid_page_is_rejected_with_the_error_envelope() {
    let app = spawn_app().await;

    for query in ["?page=abc", "?page=0", "?sortBy=likeCount", "?status=bogus"] {
        let response = app.get_posts(query).await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "{} was not rejected",
            query
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert!(body["error"]["message"].is_string());
    }
}

#[tokio::test]
async fn an_oversized_limit_is_clamped() {
    let app = spawn_app().await;
    for i in 0..60 {
        app.seed_post(&format!("clamp-{:02}", i), "published").await;
    }

    let response = app.get_posts("?limit=500").await;

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 50);
    assert_eq!(body["pagination"]["limit"], 50);
}

#[tokio::test]
async fn search_matches_title_content_and_excerpt() {
    let app = spawn_app().await;
    let post_id = app.seed_post("about-borrowing", "published").await;
    sqlx::query("UPDATE posts SET content = 'All about the borrow checker.' WHERE id = $1")
        .bind(post_id)
        .execute(&app.connection_pool)
        .await
        .unwrap();
    app.seed_post("unrelated", "published").await;

    let response = app.get_posts("?search=borrow%20checker").await;

    let body: serde_json::Value = response.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["slug"], "about-borrowing");
}

#[tokio::test]
async fn published_date_bounds_are_inclusive() {
    let app = spawn_app().await;
    app.seed_post_published_at("before", "published", at("2025-06-14T12:00:00Z"))
        .await;
    app.seed_post_published_at("on-the-bound", "published", at("2025-06-15T12:00:00Z"))
        .await;
    app.seed_post_published_at("after", "published", at("2025-06-16T12:00:00Z"))
        .await;

    // A post published exactly at the lower bound is included.
    let response = app
        .get_posts("?publishedAfter=2025-06-15T12:00:00Z&sortOrder=asc")
        .await;
    let body: serde_json::Value = response.json().await.unwrap();
    let slugs: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["on-the-bound", "after"]);

    // And exactly at the upper bound too.
    let response = app
        .get_posts("?publishedBefore=2025-06-15T12:00:00Z&sortOrder=asc")
        .await;
    let body: serde_json::Value = response.json().await.unwrap();
    let slugs: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["before", "on-the-bound"]);
}

#[tokio::test]
async fn tag_filter_matches_posts_carrying_any_given_tag() {
    let app = spawn_app().await;
    let rust_tag = app.seed_tag("rust").await;
    let axum_tag = app.seed_tag("axum").await;
    let sql_tag = app.seed_tag("sql").await;

    let rust_post = app.seed_post("rust-only", "published").await;
    let axum_post = app.seed_post("axum-only", "published").await;
    let sql_post = app.seed_post("sql-only", "published").await;
    app.seed_post("untagged", "published").await;
    app.attach_tag(rust_post, rust_tag).await;
    app.attach_tag(axum_post, axum_tag).await;
    app.attach_tag(sql_post, sql_tag).await;

    let response = app.get_posts("?tags=rust,axum").await;

    let body: serde_json::Value = response.json().await.unwrap();
    let mut slugs: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["slug"].as_str().unwrap())
        .collect();
    slugs.sort_unstable();
    // Either tag qualifies; neither the other tag nor the untagged post does.
    assert_eq!(slugs, vec!["axum-only", "rust-only"]);
    assert_eq!(body["pagination"]["total"], 2);
}

#[tokio::test]
async fn reading_a_post_increments_its_view_count() {
    let app = spawn_app().await;
    app.seed_post("counted", "published").await;

    let first = app.get_post("counted", "").await;
    assert_eq!(200, first.status().as_u16());
    let body: serde_json::Value = first.json().await.unwrap();
    // The response reflects the view it just recorded.
    assert_eq!(body["viewCount"], 1);

    let second = app.get_post("counted", "").await;
    let body: serde_json::Value = second.json().await.unwrap();
    assert_eq!(body["viewCount"], 2);
}

#[tokio::test]
async fn concurrent_reads_never_lose_a_view() {
    let app = spawn_app().await;
    app.seed_post("contended", "published").await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let client = app.api_client.clone();
        let url = format!("{}/api/posts/contended", &app.address);
        handles.push(tokio::spawn(async move {
            client.get(url).send().await.expect("request failed")
        }));
    }
    for handle in handles {
        assert_eq!(200, handle.await.unwrap().status().as_u16());
    }

    let view_count: i64 =
        sqlx::query_scalar("SELECT view_count FROM posts WHERE slug = 'contended'")
            .fetch_one(&app.connection_pool)
            .await
            .unwrap();
    assert_eq!(view_count, 20);
}

#[tokio::test]
async fn view_false_reads_without_counting() {
    let app = spawn_app().await;
    app.seed_post("prefetched", "published").await;

    let response = app.get_post("prefetched", "?view=false").await;
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["viewCount"], 0);

    let view_count: i64 =
        sqlx::query_scalar("SELECT view_count FROM posts WHERE slug = 'prefetched'")
            .fetch_one(&app.connection_pool)
            .await
            .unwrap();
    assert_eq!(view_count, 0);
}

#[tokio::test]
async fn reading_a_draft_does_not_count_a_view() {
    let app = spawn_app().await;
    app.seed_post("wip", "draft").await;

    let response = app.get_post("wip", "").await;
    assert_eq!(200, response.status().as_u16());

    let view_count: i64 = sqlx::query_scalar("SELECT view_count FROM posts WHERE slug = 'wip'")
        .fetch_one(&app.connection_pool)
        .await
        .unwrap();
    assert_eq!(view_count, 0);
}

#[tokio::test]
async fn an_unknown_slug_is_a_404() {
    let app = spawn_app().await;

    let response = app.get_post("no-such-post", "").await;

    assert_eq!(404, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn featured_filter_narrows_the_listing() {
    let app = spawn_app().await;
    let featured_id = app.seed_post("starred", "published").await;
    sqlx::query("UPDATE posts SET featured = TRUE WHERE id = $1")
        .bind(featured_id)
        .execute(&app.connection_pool)
        .await
        .unwrap();
    app.seed_post("ordinary", "published").await;

    let response = app.get_posts("?featured=true").await;

    let body: serde_json::Value = response.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["slug"], "starred");
}
