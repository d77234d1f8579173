//! BoxResponseProvider -- object-safe dynamic dispatch wrapper for ResponseProvider.
//!
//! 1. Define an object-safe `ResponseProviderDyn` trait with boxed futures
//! 2. Blanket-impl `ResponseProviderDyn` for all `T: ResponseProvider`
//! 3. `BoxResponseProvider` wraps `Box<dyn ResponseProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

use jarvis_types::error::ProviderError;
use jarvis_types::message::{Message, QuickReply};

use super::provider::ResponseProvider;

/// Object-safe version of [`ResponseProvider`] with boxed futures.
///
/// A blanket implementation is provided for all types implementing `ResponseProvider`.
pub trait ResponseProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn get_reply_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>>;

    fn fetch_older_boxed(
        &self,
        before: Option<DateTime<Utc>>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Message>, ProviderError>> + Send + '_>>;

    fn quick_replies(&self) -> Vec<QuickReply>;
}

impl<T: ResponseProvider> ResponseProviderDyn for T {
    fn name(&self) -> &str {
        ResponseProvider::name(self)
    }

    fn get_reply_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        Box::pin(self.get_reply(text))
    }

    fn fetch_older_boxed(
        &self,
        before: Option<DateTime<Utc>>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Message>, ProviderError>> + Send + '_>> {
        Box::pin(self.fetch_older(before))
    }

    fn quick_replies(&self) -> Vec<QuickReply> {
        ResponseProvider::quick_replies(self)
    }
}

/// Type-erased response provider for runtime provider selection.
///
/// Since `ResponseProvider` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxResponseProvider` provides equivalent methods that delegate
/// to the inner `ResponseProviderDyn` trait object.
pub struct BoxResponseProvider {
    inner: Box<dyn ResponseProviderDyn + Send + Sync>,
}

impl BoxResponseProvider {
    /// Wrap a concrete `ResponseProvider` in a type-erased box.
    pub fn new<T: ResponseProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn get_reply(&self, text: &str) -> Result<String, ProviderError> {
        self.inner.get_reply_boxed(text).await
    }

    pub async fn fetch_older(
        &self,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Message>, ProviderError> {
        self.inner.fetch_older_boxed(before).await
    }

    pub fn quick_replies(&self) -> Vec<QuickReply> {
        self.inner.quick_replies()
    }
}

impl std::fmt::Debug for BoxResponseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxResponseProvider")
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoProvider;

    impl ResponseProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn get_reply(&self, text: &str) -> Result<String, ProviderError> {
            Ok(format!("echo: {text}"))
        }

        async fn fetch_older(
            &self,
            _before: Option<DateTime<Utc>>,
        ) -> Result<Vec<Message>, ProviderError> {
            Err(ProviderError::Unavailable)
        }

        fn quick_replies(&self) -> Vec<QuickReply> {
            vec![QuickReply::new("1", "again")]
        }
    }

    #[tokio::test]
    async fn boxed_provider_delegates() {
        let provider = BoxResponseProvider::new(EchoProvider);
        assert_eq!(provider.name(), "echo");
        assert_eq!(provider.get_reply("hi").await.unwrap(), "echo: hi");
        assert_eq!(
            provider.fetch_older(None).await.unwrap_err(),
            ProviderError::Unavailable
        );
        assert_eq!(provider.quick_replies().len(), 1);
    }

    #[test]
    fn debug_shows_name() {
        let provider = BoxResponseProvider::new(EchoProvider);
        assert!(format!("{provider:?}").contains("echo"));
    }
}
