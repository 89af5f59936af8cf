pub mod job;
pub mod upload;

pub use job::{Job, JobResponse, JobStatus};
pub use upload::{UploadRequest, UploadResponse, UploadResult};
