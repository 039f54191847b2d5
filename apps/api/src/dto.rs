mod audit;
mod batch;
mod common;

pub use audit::AuditLogEntryResponse;
pub use batch::{BatchDeleteData, BatchDeleteRequest, ItemOutcomeResponse, summary_message};
pub use common::{ApiEnvelope, ErrorBody, ErrorResponse, HealthResponse, ResponseMeta};
