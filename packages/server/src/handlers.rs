//! HTTP handler functions for the accident risk API.

use accident_risk_analytics::{execute_tool, render};
use accident_risk_analytics_models::tool_definitions;
use accident_risk_server_models::{ApiError, ApiHealth};
use actix_web::{HttpResponse, web};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        strategy: state.store.strategy().to_string(),
    })
}

/// `GET /api/tools`
///
/// Returns the name, description, and parameter schema of every tool.
pub async fn tools() -> HttpResponse {
    HttpResponse::Ok().json(tool_definitions())
}

/// `POST /api/tools/{name}`
///
/// Runs one tool with the JSON body as its parameters. An empty body
/// means all defaults. Invalid arguments come back as a `200` error
/// document; only store failures produce a `500`.
pub async fn call_tool(
    state: web::Data<AppState>,
    name: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    let name = name.into_inner();

    let input: serde_json::Value = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(e) => {
                return HttpResponse::BadRequest().json(ApiError {
                    error: format!("Invalid JSON body: {e}"),
                });
            }
        }
    };

    let store = state.store.clone();
    let tool = name.clone();
    let result = web::block(move || execute_tool(&store, &tool, &input)).await;

    match result {
        Ok(Ok(value)) => HttpResponse::Ok()
            .content_type("application/json")
            .body(render(&value)),
        Ok(Err(e)) => {
            log::error!("Tool {name} failed: {e}");
            HttpResponse::InternalServerError().json(ApiError {
                error: e.to_string(),
            })
        }
        Err(e) => {
            log::error!("Tool {name} did not complete: {e}");
            HttpResponse::InternalServerError().json(ApiError {
                error: format!("Failed to run {name}"),
            })
        }
    }
}
