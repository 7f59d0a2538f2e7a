//! Placeholder provider used when no completion service is configured

use async_trait::async_trait;

use crate::provider::{LlmError, LlmProvider, LlmRequest, LlmResponse};

/// Fails every completion with [`LlmError::NotAvailable`].
///
/// Lets the server start without credentials while still refusing to
/// produce feedback nobody asked a model for.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredProvider;

#[async_trait]
impl LlmProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn is_available(&self) -> bool {
        false
    }

    async fn complete(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
        Err(LlmError::NotAvailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_call_fails() {
        let provider = UnconfiguredProvider;
        assert!(!provider.is_available().await);
        assert!(matches!(provider.ask("hi").await, Err(LlmError::NotAvailable)));
    }
}
