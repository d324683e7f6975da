use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use time::OffsetDateTime;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;
use crate::{transcripts, users};

pub fn build_app(state: AppState) -> anyhow::Result<Router> {
    // CORS covers the /api subtree only; the root redirect stays plain.
    let api = Router::new()
        .route("/health", get(health))
        .merge(transcripts::router())
        .merge(users::router())
        .layer(cors_layer(&state.config.frontend_origin)?);

    let app = Router::new()
        .route("/", get(index))
        .nest("/api", api)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        );

    Ok(app)
}

fn cors_layer(frontend_origin: &str) -> anyhow::Result<CorsLayer> {
    if frontend_origin == "*" {
        return Ok(CorsLayer::permissive());
    }
    let origin: HeaderValue = frontend_origin
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid FRONTEND_ORIGIN: {frontend_origin}"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [(header::LOCATION, state.config.frontend_url.clone())],
    )
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    time: OffsetDateTime,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        time: OffsetDateTime::now_utc(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_app() -> Router {
        build_app(AppState::fake()).expect("build app")
    }

    async fn get_path(path: &str) -> axum::http::Response<Body> {
        test_app()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_json(path: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let res = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_ok_with_timestamp() {
        let res = get_path("/api/health").await;
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert!(body["time"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn root_redirects_to_frontend() {
        let res = get_path("/").await;
        assert_eq!(res.status(), StatusCode::FOUND);
        let location = res.headers().get(header::LOCATION).unwrap();
        assert_eq!(location, "http://localhost:8080");
    }

    #[tokio::test]
    async fn blank_transcript_text_is_rejected() {
        let (status, body) = post_json("/api/transcripts", r#"{"text":"  "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "text is required");
    }

    #[tokio::test]
    async fn malformed_json_body_reads_as_empty_payload() {
        let (status, body) = post_json("/api/transcripts", "definitely not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "text is required");
    }

    #[tokio::test]
    async fn register_requires_all_fields() {
        let (status, body) = post_json("/api/register", r#"{"first_name":"Ada"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "All fields are required");
    }

    #[tokio::test]
    async fn register_rejects_whitespace_only_fields() {
        let (status, body) = post_json(
            "/api/register",
            r#"{"first_name":" ","last_name":"B","email":"x@y.com","password":"p"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "All fields are required");
    }

    #[tokio::test]
    async fn login_requires_credentials() {
        let (status, body) = post_json("/api/login", r#"{"email":"  "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email and password are required");
    }
}
