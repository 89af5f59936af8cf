pub mod analysis;
pub mod upload;

pub use analysis::AcknowledgeAnalysis;
pub use upload::UploadService;
