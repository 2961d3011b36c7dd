pub mod assistant_llm;
pub mod db;
pub mod genai;
pub mod memory;
pub mod report_llm;
pub mod valuation_llm;
pub mod vision;

pub use assistant_llm::OpenAiAssistantAdapter;
pub use db::DbAdapter;
pub use memory::InMemoryDb;
pub use report_llm::OpenAiReportAdapter;
pub use valuation_llm::OpenAiValuationAdapter;
pub use vision::HttpVisionAdapter;
