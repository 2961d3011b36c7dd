pub mod assistant;
pub mod domain;
pub mod error;
pub mod orchestrator;
pub mod ports;
pub mod prompts;
pub mod schema;
pub mod valuation;

pub use assistant::AssistantBuilder;
pub use domain::{
    AnalysisImage, AnalysisRecord, AnimalAttributes, BreedCandidate, NewAnalysis, ReportData,
    User, UserCredentials, Valuation, VisionHint,
};
pub use error::{ServiceError, ServiceResult};
pub use orchestrator::{HybridAnalysisRequest, HybridOrchestrator, RemoteTimeouts, ReportRequest};
pub use ports::{
    AccountStore, AnalysisStore, AssistantService, PortError, PortResult, ReportGenerationService,
    ValuationGenerationService, VisionHintService,
};
pub use valuation::ValuationBuilder;
