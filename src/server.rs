/// HTTP front end: a static form at `/` and the generator at `POST /gen`.
///
/// Provides `ServerContext` (shared state) and `Server` (startup logic).
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::generator::{GenerateError, MappingGenerator};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Body of `POST /gen`.
#[derive(Debug, Deserialize)]
pub struct GenRequest {
    pub model_struct: String,
    pub rpc_struct: String,
    #[serde(default)]
    pub rpc_package_name: String,
}

/// Shared state available to all handlers.
#[derive(Clone)]
pub struct ServerContext {
    pub generator: Arc<MappingGenerator>,
    pub config: Arc<Config>,
}

#[derive(Clone)]
pub struct Server {
    pub ctx: ServerContext,
}

impl Server {
    pub fn new(ctx: ServerContext) -> Self {
        Self { ctx }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/gen", post(generate_handler))
            .with_state(self.ctx.clone())
    }

    /// Bind `addr` and serve until the process is stopped.
    pub async fn start(self, addr: SocketAddr) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        info!("Listening on http://{addr}");

        axum::serve(listener, self.router())
            .await
            .context("HTTP server encountered an error")?;

        Ok(())
    }
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn generate_handler(
    State(ctx): State<ServerContext>,
    Json(req): Json<GenRequest>,
) -> Result<String, (StatusCode, String)> {
    let package = if req.rpc_package_name.trim().is_empty() {
        ctx.config.rpc_package_name.as_str()
    } else {
        req.rpc_package_name.as_str()
    };

    match ctx.generator.generate(&req.rpc_struct, &req.model_struct, package) {
        Ok(generated) => Ok(generated.text),
        Err(e) => {
            warn!("Generation failed: {e}");
            let status = match e {
                GenerateError::Parse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                GenerateError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err((status, e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{MappingTemplate, Renderer};

    fn context(config: Config) -> ServerContext {
        ServerContext {
            generator: Arc::new(MappingGenerator::default()),
            config: Arc::new(config),
        }
    }

    fn request(package: &str) -> GenRequest {
        GenRequest {
            model_struct: "type User struct {\n    ID int32\n}".into(),
            rpc_struct: "type UserReply struct {\n    ID int64\n}".into(),
            rpc_package_name: package.into(),
        }
    }

    #[test]
    fn test_request_package_optional() {
        let req: GenRequest =
            serde_json::from_str(r#"{"model_struct": "a", "rpc_struct": "b"}"#).unwrap();
        assert_eq!(req.rpc_package_name, "");
    }

    #[tokio::test]
    async fn test_generate_ok() {
        let out = generate_handler(State(context(Config::default())), Json(request("pb")))
            .await
            .unwrap();
        assert!(out.contains("*pb.UserReply"));
        assert!(out.contains("ID: int64(model.ID),"));
    }

    #[tokio::test]
    async fn test_generate_falls_back_to_configured_package() {
        let config = Config {
            rpc_package_name: "userpb".into(),
            ..Config::default()
        };
        let out = generate_handler(State(context(config)), Json(request("")))
            .await
            .unwrap();
        assert!(out.contains("&userpb.UserReply{"));
    }

    #[tokio::test]
    async fn test_generate_parse_error_status() {
        let mut req = request("");
        req.model_struct = "type User struct {".into();
        let (status, body) = generate_handler(State(context(Config::default())), Json(req))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.starts_with("model struct:"));
    }

    #[tokio::test]
    async fn test_generate_render_error_status() {
        let template = MappingTemplate::from_source("bad", "{{ missing }}").unwrap();
        let ctx = ServerContext {
            generator: Arc::new(MappingGenerator::new(Renderer::new(template))),
            config: Arc::new(Config::default()),
        };
        let (status, _) = generate_handler(State(ctx), Json(request("")))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_index_page() {
        let Html(page) = index_handler().await;
        assert!(page.contains("/gen"));
    }
}
