use crate::authentication::{ApiKeyIdentityResolver, AuthError, IdentityResolver};
use crate::configuration::{DatabaseSettings, Settings};
use crate::routes::constants::{ERROR_AUTHENTICATION_FAILED, ERROR_AUTHENTICATION_REQUIRED};
use crate::routes::{
    admin_create_post, admin_delete_post, admin_get_post_by_id, admin_get_post_by_slug,
    admin_list_posts, admin_post_stats, admin_update_post, error_body, get_post_by_slug,
    health_check, list_categories, list_posts, list_posts_by_category,
};
use axum::Router;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn get_connection_pool(db_configuration: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(db_configuration.connect_options())
}

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub identity_resolver: Arc<dyn IdentityResolver>,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        listener.set_nonblocking(true)?;
        let port = listener.local_addr()?.port();

        Ok(Self { port, listener })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self, configuration: Settings) -> Result<(), std::io::Error> {
        let connection_pool = get_connection_pool(&configuration.database);
        let identity_resolver = Arc::new(ApiKeyIdentityResolver::new(
            configuration.application.admin_api_key,
            connection_pool.clone(),
        ));
        let app_state = AppState {
            db: connection_pool,
            identity_resolver,
        };

        let app = api_router(app_state);
        let listener = tokio::net::TcpListener::from_std(self.listener)?;
        axum::serve(listener, app).await?;
        Ok(())
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health_check::health_check,
        crate::routes::posts::list_posts,
        crate::routes::posts::get_post_by_slug,
        crate::routes::categories::list_categories,
        crate::routes::categories::list_posts_by_category,
        crate::routes::admin::posts::admin_list_posts,
        crate::routes::admin::posts::admin_get_post_by_id,
        crate::routes::admin::posts::admin_get_post_by_slug,
        crate::routes::admin::posts::admin_create_post,
        crate::routes::admin::posts::admin_update_post,
        crate::routes::admin::posts::admin_delete_post,
        crate::routes::admin::posts::admin_post_stats,
    ),
    components(schemas(
        crate::domain::PostStatus,
        crate::routes::admin::CreatePostBody,
        crate::routes::admin::UpdatePostBody,
        crate::store::AuthorProfile,
        crate::store::AuthorSummary,
        crate::store::CategoryPosts,
        crate::store::CategoryRecord,
        crate::store::CategorySummary,
        crate::store::PageMeta,
        crate::store::PostDetail,
        crate::store::PostPage,
        crate::store::PostStats,
        crate::store::PostSummary,
        crate::store::TagSummary,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "posts", description = "Public post retrieval"),
        (name = "categories", description = "Public category retrieval"),
        (name = "admin-posts", description = "Authenticated post management"),
    )
)]
pub struct ApiDoc;

pub fn api_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route(
            "/posts",
            get(admin_list_posts).post(admin_create_post),
        )
        .route("/posts/stats", get(admin_post_stats))
        .route(
            "/posts/{id}",
            get(admin_get_post_by_id)
                .put(admin_update_post)
                .delete(admin_delete_post),
        )
        .route("/posts/slug/{slug}", get(admin_get_post_by_slug))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health_check", get(health_check))
        .route("/api/posts", get(list_posts))
        .route("/api/posts/{slug}", get(get_post_by_slug))
        .route("/api/categories", get(list_categories))
        .route("/api/categories/{slug}/posts", get(list_posts_by_category))
        .nest("/api/admin", admin_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    match state.identity_resolver.resolve(req.headers()).await {
        Ok(user_id) => {
            req.extensions_mut().insert(user_id);
            next.run(req).await
        }
        Err(e) => unauthorized_response(e),
    }
}

fn unauthorized_response(e: AuthError) -> Response {
    let (status, message) = match &e {
        AuthError::MissingCredentials => (StatusCode::UNAUTHORIZED, ERROR_AUTHENTICATION_REQUIRED),
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, ERROR_AUTHENTICATION_FAILED),
        AuthError::UnexpectedError(_) => {
            tracing::error!(error.cause_chain = ?e, "Failed to resolve the caller's identity");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                crate::routes::constants::ERROR_SOMETHING_WENT_WRONG,
            )
        }
    };
    (status, Json(error_body(message))).into_response()
}
