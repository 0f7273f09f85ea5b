//! Remote text generation for ksync.
//!
//! [`AiGateway`] is the only entry point the rest of the workspace uses. It
//! wraps a [`TextGenerator`] (normally [`GeminiApiAgent`]) with prompts,
//! output validation, retries and fallback content.

pub mod agent;
pub mod fallback;
pub mod gateway;
pub mod gemini_api_agent;
pub mod prompts;
pub mod reply;
pub mod retry;
pub mod transcript;

pub use agent::{AgentError, GenerationRequest, ResponseFormat, TextGenerator};
pub use gateway::{AiGateway, AiStatus, GatewayOptions, SUGGESTION_COUNT};
pub use gemini_api_agent::GeminiApiAgent;
pub use reply::{GatewayReply, ReplyOrigin};
pub use retry::RetryPolicy;
