use crate::core::{autofix, parser, prompt};
use crate::domain::model::{GenerationReport, GenerationRequest, InvokerRequest, Lang};
use crate::domain::ports::{ConfigProvider, ModelInvoker};
use crate::utils::error::{GenError, Result};
use std::time::Instant;

/// Sequences one generation request through its stages:
/// validate input, build prompt, invoke, parse, and at most one corrective
/// invoke-and-reparse. Holds no mutable state; invocations are independent
/// and may run concurrently.
pub struct GenerationPipeline<M: ModelInvoker, C: ConfigProvider> {
    invoker: M,
    config: C,
}

impl<M: ModelInvoker, C: ConfigProvider> GenerationPipeline<M, C> {
    pub fn new(invoker: M, config: C) -> Self {
        Self { invoker, config }
    }

    /// Runs the whole pipeline. Returns the validated bundle with timing
    /// metadata, or a single typed condition identifying the failed stage.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationReport> {
        let lang = self.validate_input(request)?;

        let started = Instant::now();
        let prompt = prompt::build_prompt(lang, request.hint.as_deref(), &request.images);
        tracing::debug!(
            lang = %lang,
            images = prompt.image_count(),
            "invoking model"
        );

        let raw = self.invoke(&prompt).await?;

        match parser::parse_listing_bundle(&raw) {
            Ok(bundle) => Ok(GenerationReport {
                bundle,
                elapsed: started.elapsed(),
                corrected: false,
            }),
            Err(failure @ (GenError::MalformedOutput { .. } | GenError::InvalidSchema { .. })) => {
                self.correct(&prompt, &raw, failure, started).await
            }
            Err(other) => Err(other),
        }
    }

    /// The single auto-fix pass. Any failure here, transport included, is
    /// terminal; there is no second retry.
    async fn correct(
        &self,
        original: &InvokerRequest,
        previous_raw: &str,
        failure: GenError,
        started: Instant,
    ) -> Result<GenerationReport> {
        tracing::warn!(failure = %failure, "first model output invalid, attempting auto-fix");

        let fix_request = autofix::corrective_request(original, previous_raw, &failure);
        let raw = self
            .invoke(&fix_request)
            .await
            .map_err(|e| GenError::GenerationFailed(Box::new(e)))?;

        match parser::parse_listing_bundle(&raw) {
            Ok(bundle) => {
                tracing::info!("auto-fix produced a valid bundle");
                Ok(GenerationReport {
                    bundle,
                    elapsed: started.elapsed(),
                    corrected: true,
                })
            }
            Err(second) => Err(GenError::GenerationFailed(Box::new(second))),
        }
    }

    /// One model call under its own timeout. The corrective call gets a
    /// fresh timeout; a hang there is never masked by the first call's
    /// success.
    async fn invoke(&self, request: &InvokerRequest) -> Result<String> {
        let timeout = self.config.request_timeout();
        match tokio::time::timeout(timeout, self.invoker.invoke(request)).await {
            Ok(result) => result,
            Err(_) => Err(GenError::ModelUnavailable {
                reason: format!("model call timed out after {}s", timeout.as_secs()),
            }),
        }
    }

    /// Rejects bad image counts and unknown language tags before any
    /// network call is made.
    fn validate_input(&self, request: &GenerationRequest) -> Result<Lang> {
        if request.images.is_empty() {
            return Err(GenError::InvalidInput {
                reason: "no images provided".to_string(),
            });
        }

        let max_images = self.config.max_images();
        if request.images.len() > max_images {
            return Err(GenError::InvalidInput {
                reason: format!(
                    "too many images: {} provided, at most {} allowed",
                    request.images.len(),
                    max_images
                ),
            });
        }

        if request.images.iter().all(|image| image.bytes.is_empty()) {
            return Err(GenError::InvalidInput {
                reason: "images are empty or unsupported".to_string(),
            });
        }

        Lang::parse(&request.lang).ok_or_else(|| GenError::InvalidInput {
            reason: format!(
                "unsupported language tag '{}', expected one of ru, kz, en",
                request.lang
            ),
        })
    }
}
