pub mod provider;
pub mod providers;
pub mod types;

pub use provider::{CompletionProvider, CompletionRequest, ProviderError};
pub use providers::ResponsesProvider;
pub use types::{Message, Role, StreamChunk};
