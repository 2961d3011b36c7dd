//! services/api/src/web/openapi.rs
//!
//! The master definition for the OpenAPI specification.

use utoipa::OpenApi;

use crate::web::{analyses, analyze, auth, generate};

#[derive(OpenApi)]
#[openapi(
    paths(
        analyze::analyze_handler,
        generate::report_handler,
        generate::valuation_handler,
        generate::assistant_handler,
        analyses::list_analyses_handler,
        analyses::create_analysis_handler,
        analyses::get_analysis_handler,
        analyses::hybrid_analysis_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
    ),
    components(
        schemas(
            analyses::AnalysisResponse,
            analyses::CreateAnalysisRequest,
            generate::ReportPayload,
            generate::ValuationPayload,
            generate::AssistantPayload,
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
        )
    ),
    tags(
        (name = "analyze", description = "Breed detection on an uploaded photo."),
        (name = "generate", description = "Report, valuation and assistant generation."),
        (name = "analyses", description = "The signed-in user's saved analyses."),
        (name = "auth", description = "Accounts and sessions.")
    )
)]
pub struct ApiDoc;
