use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderName, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use platform_db::DbPool;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::{
    charts::ChartRenderer,
    feedback::{self, FeedbackForm, SubmitOutcome},
    pages, stats,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub renderer: ChartRenderer,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "pulse server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/", get(home_handler))
        .route(
            "/feedback",
            get(feedback_form_handler).post(feedback_submit_handler),
        )
        .route("/feedback_submitted", get(feedback_submitted_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

async fn home_handler() -> Html<&'static str> {
    Html(pages::INDEX)
}

async fn feedback_form_handler() -> Html<&'static str> {
    Html(pages::FEEDBACK_FORM)
}

async fn feedback_submitted_handler() -> Html<&'static str> {
    Html(pages::FEEDBACK_SUBMITTED)
}

async fn feedback_submit_handler(
    State(state): State<AppState>,
    Form(form): Form<FeedbackForm>,
) -> HttpResult<Response> {
    if let Err(message) = form.validate() {
        return Err(HttpError::new(StatusCode::BAD_REQUEST, &message));
    }
    let name = form.name.trim().to_string();
    match feedback::submit(&state.pool, form).await {
        Ok(SubmitOutcome::Submitted) => Ok(Redirect::to("/feedback_submitted").into_response()),
        Ok(SubmitOutcome::Duplicate) => {
            info!(%name, "duplicate feedback submission");
            Ok(Html(pages::duplicate_notice(&name)).into_response())
        }
        Err(err) => Err(HttpError::internal(err.into())),
    }
}

async fn stats_handler(State(state): State<AppState>) -> HttpResult<Html<String>> {
    let view = stats::build_stats(&state.pool, &state.renderer)
        .await
        .map_err(HttpError::internal)?;
    Ok(Html(pages::stats_page(&view)))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = state.pool.execute_unprepared("SELECT 1").await.is_ok();
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
        }
    }

    fn internal(err: anyhow::Error) -> Self {
        error!(error = %err, "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal server error".to_string(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use entity::feedback as feedback_entity;
    use http_body_util::BodyExt;
    use sea_orm::{Database, EntityTrait};
    use tower::ServiceExt;

    const ADA: &str = "name=Ada&department=Engineering&work_environment=4&management=5&work_life_balance=3&development_potential=4&overall=5";

    async fn test_state() -> AppState {
        let pool = Database::connect("sqlite::memory:").await.unwrap();
        bootstrap_sqlite(&pool).await;
        AppState {
            pool,
            renderer: ChartRenderer::default(),
        }
    }

    async fn bootstrap_sqlite(pool: &DbPool) {
        pool.execute_unprepared(
            r#"
            CREATE TABLE feedback (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                department TEXT NOT NULL,
                work_environment INTEGER NOT NULL CHECK (work_environment BETWEEN 1 AND 5),
                management INTEGER NOT NULL CHECK (management BETWEEN 1 AND 5),
                work_life_balance INTEGER NOT NULL CHECK (work_life_balance BETWEEN 1 AND 5),
                development_potential INTEGER NOT NULL CHECK (development_potential BETWEEN 1 AND 5),
                overall INTEGER NOT NULL CHECK (overall BETWEEN 1 AND 5),
                created_at TEXT NOT NULL
            );
            "#,
        )
        .await
        .unwrap();
    }

    fn submit_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/feedback")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn record_count(pool: &DbPool) -> usize {
        feedback_entity::Entity::find().all(pool).await.unwrap().len()
    }

    #[tokio::test]
    async fn static_pages_render() {
        let router = build_router(test_state().await);
        for path in ["/", "/feedback", "/feedback_submitted"] {
            let response = router
                .clone()
                .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        }
    }

    #[tokio::test]
    async fn fresh_submission_creates_record_and_redirects() {
        let state = test_state().await;
        let router = build_router(state.clone());
        let response = router.oneshot(submit_request(ADA)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/feedback_submitted"
        );
        assert_eq!(record_count(&state.pool).await, 1);
    }

    #[tokio::test]
    async fn duplicate_submission_keeps_one_record_and_notices() {
        let state = test_state().await;
        let router = build_router(state.clone());
        let first = router.clone().oneshot(submit_request(ADA)).await.unwrap();
        assert_eq!(first.status(), StatusCode::SEE_OTHER);

        let second = router.oneshot(submit_request(ADA)).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        let body = body_text(second).await;
        assert!(body.contains("Already submitted"));
        assert!(body.contains("Ada"));
        assert_eq!(record_count(&state.pool).await, 1);
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected_before_insert() {
        let state = test_state().await;
        let router = build_router(state.clone());
        let bad = "name=Bob&department=Sales&work_environment=4&management=5&work_life_balance=3&development_potential=4&overall=6";
        let response = router.oneshot(submit_request(bad)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(record_count(&state.pool).await, 0);
    }

    #[tokio::test]
    async fn non_numeric_rating_is_rejected() {
        let state = test_state().await;
        let router = build_router(state.clone());
        let bad = "name=Bob&department=Sales&work_environment=4&management=5&work_life_balance=3&development_potential=4&overall=great";
        let response = router.oneshot(submit_request(bad)).await.unwrap();
        assert!(response.status().is_client_error());
        assert_eq!(record_count(&state.pool).await, 0);
    }

    #[tokio::test]
    async fn stats_page_embeds_four_charts() {
        let state = test_state().await;
        let router = build_router(state.clone());
        let submit = router
            .clone()
            .oneshot(submit_request(ADA))
            .await
            .unwrap();
        assert_eq!(submit.status(), StatusCode::SEE_OTHER);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert_eq!(body.matches("data:image/png;base64,").count(), 4);
        assert!(body.contains("5.00"));
    }

    #[tokio::test]
    async fn stats_page_handles_empty_dataset() {
        let router = build_router(test_state().await);
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("0.00"));
        assert!(body.contains("negative"));
        assert_eq!(body.matches("data:image/png;base64,").count(), 4);
    }
}
