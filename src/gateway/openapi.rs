//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "GalangDana Withdrawal API",
        version = "1.0.0",
        description = "Withdrawal lifecycle engine for the GalangDana donation platform: \
                       campaign owners request payouts of collected funds, admins review \
                       and settle them.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::withdrawal::request_withdrawal,
        crate::gateway::handlers::withdrawal::get_withdrawal,
        crate::gateway::handlers::withdrawal::approve_withdrawal,
        crate::gateway::handlers::withdrawal::reject_withdrawal,
        crate::gateway::handlers::withdrawal::process_withdrawal,
        crate::gateway::handlers::withdrawal::complete_withdrawal,
        crate::gateway::handlers::withdrawal::cancel_withdrawal,
        crate::gateway::handlers::withdrawal::campaign_withdrawals,
    ),
    tags(
        (name = "System", description = "Health and diagnostics"),
        (name = "Withdrawal", description = "Withdrawal lifecycle operations")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_doc_builds() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        assert!(json.contains("/api/v1/withdrawals"));
        assert!(json.contains("/api/v1/health"));
    }
}
