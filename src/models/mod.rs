// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

mod traits;
mod types;

pub use traits::{FragmentStream, ModelHost};
pub use types::{ChatMessage, MessageRole, ModelDetails};

#[cfg(test)]
pub use traits::MockModelHost;
