//! Axum HTTP handlers serving the schema:
//! - `POST /graphql` - JSON body with `query`, `operationName` and `variables`
//! - `GET /graphql` - the same fields as URL parameters, `variables` as a JSON string
//!
//! Browsers asking for HTML on `GET /graphql` get the GraphiQL IDE instead.

use std::net::SocketAddr;
use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql::{Request, Response, Variables};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use graphql_factory::CompiledSchema;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::model::Context;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub schema: CompiledSchema<Context>,
    pub context_content: Arc<str>,
    /// Serve GraphiQL to browsers on `GET /graphql`.
    pub graphiql: bool,
}

impl AppState {
    pub fn new(schema: CompiledSchema<Context>, context_content: impl Into<Arc<str>>) -> Self {
        Self {
            schema,
            context_content: context_content.into(),
            graphiql: true,
        }
    }

    #[must_use]
    pub fn with_graphiql(mut self, enabled: bool) -> Self {
        self.graphiql = enabled;
        self
    }

    fn context(&self) -> Context {
        Context::new(self.context_content.as_ref())
    }
}

/// GraphQL request body.
#[derive(Debug, Deserialize)]
pub struct GraphQLRequest {
    pub query: String,

    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    pub variables: Option<serde_json::Value>,
}

impl From<GraphQLRequest> for Request {
    fn from(req: GraphQLRequest) -> Self {
        let mut request = Request::new(req.query);
        if let Some(name) = req.operation_name {
            request = request.operation_name(name);
        }
        if let Some(variables) = req.variables {
            request = request.variables(Variables::from_json(variables));
        }
        request
    }
}

/// Query parameters for GET requests.
#[derive(Debug, Deserialize)]
pub struct GraphQLQueryParams {
    pub query: Option<String>,

    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    /// Variables as a JSON string.
    pub variables: Option<String>,
}

/// Response body: `data` is omitted when execution produced none.
#[derive(Debug, Serialize)]
pub struct GraphQLResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<serde_json::Value>,
}

impl From<Response> for GraphQLResponse {
    fn from(resp: Response) -> Self {
        let data_json = serde_json::to_value(&resp.data).unwrap_or(serde_json::Value::Null);
        let data = if data_json.is_null() && !resp.errors.is_empty() {
            None
        } else {
            Some(data_json)
        };
        let errors = resp
            .errors
            .iter()
            .map(|e| serde_json::to_value(e).unwrap_or(serde_json::Value::Null))
            .collect();
        Self { data, errors }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/graphql", get(graphql_handler_get).post(graphql_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handles POST requests to /graphql.
pub async fn graphql_handler(
    State(state): State<AppState>,
    Json(request): Json<GraphQLRequest>,
) -> impl IntoResponse {
    debug!(operation = ?request.operation_name, "Processing GraphQL request");
    execute(&state, request).await
}

/// Handles GET requests to /graphql.
pub async fn graphql_handler_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<GraphQLQueryParams>,
) -> axum::response::Response {
    if state.graphiql && accepts_html(&headers) {
        return graphiql().await.into_response();
    }
    let request = match params_to_request(params) {
        Ok(req) => req,
        Err(message) => return error_response(&message).into_response(),
    };
    debug!(operation = ?request.operation_name, "Processing GraphQL GET request");
    execute(&state, request).await.into_response()
}

async fn execute(state: &AppState, request: GraphQLRequest) -> Json<GraphQLResponse> {
    let response = state.schema.execute(request, state.context()).await;
    if response.is_err() {
        debug!(errors = response.errors.len(), "GraphQL request produced errors");
    }
    Json(GraphQLResponse::from(response))
}

fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// GraphiQL IDE pointed at this endpoint.
pub async fn graphiql() -> impl IntoResponse {
    Html(
        GraphiQLSource::build()
            .endpoint("/graphql")
            .title("Star Wars GraphiQL")
            .finish(),
    )
}

fn params_to_request(params: GraphQLQueryParams) -> Result<GraphQLRequest, String> {
    let Some(query) = params.query.filter(|q| !q.trim().is_empty()) else {
        return Err("missing query parameter".into());
    };
    let variables = match params.variables {
        Some(vars) => Some(
            serde_json::from_str(&vars).map_err(|e| format!("invalid variables: {e}"))?,
        ),
        None => None,
    };
    Ok(GraphQLRequest {
        query,
        operation_name: params.operation_name,
        variables,
    })
}

fn error_response(message: &str) -> impl IntoResponse {
    let body = serde_json::json!({
        "errors": [{ "message": message }]
    });
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
}

/// Serves until Ctrl+C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_to_request() {
        let params = GraphQLQueryParams {
            query: Some("{ hero { name } }".into()),
            operation_name: None,
            variables: Some(r#"{"id":"1000"}"#.into()),
        };
        let request = params_to_request(params).unwrap();
        assert_eq!(request.query, "{ hero { name } }");
        assert_eq!(request.variables, Some(serde_json::json!({ "id": "1000" })));
    }

    #[test]
    fn test_params_require_query() {
        let params = GraphQLQueryParams {
            query: Some("  ".into()),
            operation_name: None,
            variables: None,
        };
        assert_eq!(params_to_request(params).unwrap_err(), "missing query parameter");

        let params = GraphQLQueryParams {
            query: Some("{ hero { name } }".into()),
            operation_name: None,
            variables: Some("{not json".into()),
        };
        assert!(params_to_request(params).unwrap_err().starts_with("invalid variables"));
    }

    #[test]
    fn test_accepts_html() {
        let mut headers = HeaderMap::new();
        assert!(!accepts_html(&headers));
        headers.insert(header::ACCEPT, "application/json".parse().unwrap());
        assert!(!accepts_html(&headers));
        headers.insert(
            header::ACCEPT,
            "text/html,application/xhtml+xml;q=0.9".parse().unwrap(),
        );
        assert!(accepts_html(&headers));
    }

    #[test]
    fn test_response_omits_missing_data() {
        let response = Response::from_errors(vec![async_graphql::ServerError::new(
            "boom", None,
        )]);
        let body = serde_json::to_value(GraphQLResponse::from(response)).unwrap();
        assert_eq!(body, serde_json::json!({ "errors": [{ "message": "boom" }] }));
    }
}
