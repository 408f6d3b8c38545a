//! The generation backend trait.

use async_trait::async_trait;
use coursewright_core::{GenerateRequest, GenerateResponse};
use coursewright_error::CoursewrightResult;
use std::sync::Arc;

/// A request/response generation backend.
///
/// One call to [`generate`](CoursewrightDriver::generate) is one completion.
/// Implementations report transport and API failures as errors; they do not
/// inspect or validate the generated text.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use coursewright_core::{GenerateRequest, GenerateResponse};
/// use coursewright_error::CoursewrightResult;
/// use coursewright_interface::CoursewrightDriver;
///
/// struct Echo;
///
/// #[async_trait]
/// impl CoursewrightDriver for Echo {
///     async fn generate(&self, req: &GenerateRequest) -> CoursewrightResult<GenerateResponse> {
///         let last = req.messages().last().map(|m| m.content().clone()).unwrap_or_default();
///         Ok(GenerateResponse::text(last))
///     }
///
///     fn provider_name(&self) -> &'static str {
///         "echo"
///     }
///
///     fn model_name(&self) -> &str {
///         "echo-1"
///     }
/// }
/// ```
#[async_trait]
pub trait CoursewrightDriver: Send + Sync {
    /// Send a request and wait for the completion.
    async fn generate(&self, req: &GenerateRequest) -> CoursewrightResult<GenerateResponse>;

    /// Provider name for logging.
    fn provider_name(&self) -> &'static str;

    /// Default model identifier used when a request names none.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<D> CoursewrightDriver for Arc<D>
where
    D: CoursewrightDriver + ?Sized,
{
    async fn generate(&self, req: &GenerateRequest) -> CoursewrightResult<GenerateResponse> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
