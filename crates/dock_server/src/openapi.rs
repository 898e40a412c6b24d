//! OpenAPI document and documentation pages.

use dock_deploy::ServableApp;
use dock_module::Protocol;
use serde_json::{json, Map, Value};

use crate::auth::AuthSettings;

/// Name of the bearer security scheme in the document.
pub const SECURITY_SCHEME: &str = "HTTPBearer";

/// One documented operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSpec {
    pub method: &'static str,
    pub path: &'static str,
    pub operation_id: &'static str,
    pub summary: &'static str,
    pub tag: &'static str,
}

const fn route(
    method: &'static str,
    path: &'static str,
    operation_id: &'static str,
    summary: &'static str,
    tag: &'static str,
) -> RouteSpec {
    RouteSpec {
        method,
        path,
        operation_id,
        summary,
        tag,
    }
}

const REST_ROUTES: &[RouteSpec] = &[
    route("get", "/health", "health", "Health check", "Core"),
    route("get", "/status", "status", "App status", "Core"),
    route("get", "/v1/agents", "list_agents", "List agents", "Agents"),
    route("get", "/v1/agents/{agent_id}", "get_agent", "Get agent", "Agents"),
    route("post", "/v1/agents/{agent_id}/runs", "create_agent_run", "Run agent", "Agents"),
    route("get", "/v1/teams", "list_teams", "List teams", "Teams"),
    route("get", "/v1/teams/{team_id}", "get_team", "Get team", "Teams"),
    route("post", "/v1/teams/{team_id}/runs", "create_team_run", "Run team", "Teams"),
];

const AGUI_ROUTES: &[RouteSpec] = &[
    route("get", "/health", "health", "Health check", "Core"),
    route("get", "/status", "status", "App status", "Core"),
    route("post", "/agui", "run_agent", "Run via the AG-UI protocol", "AG-UI"),
];

/// Documented operations for `protocol`.
pub fn route_table(protocol: Protocol) -> &'static [RouteSpec] {
    match protocol {
        Protocol::Rest => REST_ROUTES,
        Protocol::Agui => AGUI_ROUTES,
    }
}

/// Build the OpenAPI document. With auth, every operation outside the
/// public allowlist is marked with the bearer scheme.
pub fn openapi_document(app: &ServableApp, auth: Option<&AuthSettings>) -> Value {
    let mut paths = Map::new();
    for spec in route_table(app.app.protocol) {
        let mut operation = json!({
            "operationId": spec.operation_id,
            "summary": spec.summary,
            "tags": [spec.tag],
            "responses": {
                "200": { "description": "Successful Response" }
            },
        });

        if let Some(params) = path_parameters(spec.path) {
            operation["parameters"] = params;
        }
        if spec.method == "post" {
            operation["requestBody"] = json!({
                "required": true,
                "content": { "application/json": { "schema": { "type": "object" } } }
            });
        }
        if let Some(settings) = auth {
            if !settings.is_public(spec.path) {
                operation["security"] = json!([{ SECURITY_SCHEME: [] }]);
                operation["responses"]["401"] = json!({ "description": "Authentication required" });
            }
        }

        let entry = paths
            .entry(spec.path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        entry[spec.method] = operation;
    }

    let mut document = json!({
        "openapi": "3.1.0",
        "info": {
            "title": app.title(),
            "version": env!("CARGO_PKG_VERSION"),
            "description": app
                .app
                .description
                .clone()
                .unwrap_or_else(|| format!("Served from {}", app.entry_point())),
        },
        "paths": paths,
    });

    if auth.is_some() {
        document["components"] = json!({
            "securitySchemes": {
                SECURITY_SCHEME: {
                    "type": "http",
                    "scheme": "bearer",
                    "description": "Enter your authentication token",
                }
            }
        });
    }

    document
}

fn path_parameters(path: &str) -> Option<Value> {
    let params: Vec<Value> = path
        .split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
        .map(|name| {
            json!({
                "name": name,
                "in": "path",
                "required": true,
                "schema": { "type": "string" },
            })
        })
        .collect();
    (!params.is_empty()).then(|| Value::Array(params))
}

/// Swagger UI page for `/docs`.
pub fn swagger_ui_html(title: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html>
<head>
<title>{title} - Swagger UI</title>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
<div id="swagger-ui"></div>
<script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
<script>
SwaggerUIBundle({{ url: "/openapi.json", dom_id: "#swagger-ui", persistAuthorization: true }});
</script>
</body>
</html>"##,
        title = title
    )
}

/// ReDoc page for `/redoc`.
pub fn redoc_html(title: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html>
<head>
<title>{title} - ReDoc</title>
</head>
<body>
<redoc spec-url="/openapi.json"></redoc>
<script src="https://cdn.jsdelivr.net/npm/redoc@2/bundles/redoc.standalone.js"></script>
</body>
</html>"##,
        title = title
    )
}
