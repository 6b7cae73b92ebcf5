//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, visitors};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Visitor Log API",
        version = "1.0.0",
        description = "Front desk visitor check-in/check-out REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "Visitor Log API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Visitors
        visitors::register_visitor,
        visitors::list_visitors,
        visitors::visitor_summary,
        visitors::get_visitor,
        visitors::check_out_visitor,
        // Administration
        visitors::purge_today,
    ),
    components(
        schemas(
            // Visitors
            crate::models::visitor::Visitor,
            crate::models::visitor::VisitorStatus,
            crate::models::visitor::VisitorView,
            crate::models::visitor::CreateVisitor,
            crate::models::visitor::VisitorQuery,
            crate::models::visitor::VisitorSummary,
            visitors::PurgeResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "visitors", description = "Visitor check-in, check-out and listings"),
        (name = "admin", description = "Administrative operations")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_visitor_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/visitors", "/visitors/{id}/checkout", "/visitors/summary"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
