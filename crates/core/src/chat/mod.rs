pub mod intent;
pub mod session;

pub use intent::{detect_mcp_request, McpRequest};
pub use session::ChatSession;
