pub mod authoring;
pub mod comment_poster;
pub mod http;
pub mod scan_client;
pub mod synthesis;

pub use authoring::PrAgentClient;
pub use comment_poster::McpCommentPoster;
pub use scan_client::ScanServiceClient;
pub use synthesis::SynthesisServiceClient;
