use prowl_core::{ProwlError, ReviewPrompt, ReviewResult};

use crate::llm::CompletionService;

/// Sends review prompts to a completion service and splits the answer
/// into lines.
///
/// One request per call. Retries are left to the polling cadence.
pub struct ReviewRequester<C> {
    service: C,
    model: String,
}

impl<C: CompletionService> ReviewRequester<C> {
    pub fn new(service: C, model: impl Into<String>) -> Self {
        Self {
            service,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn service(&self) -> &C {
        &self.service
    }

    /// Request a review for `prompt`.
    ///
    /// # Errors
    ///
    /// Propagates [`ProwlError::Service`] from the completion service.
    pub async fn request_review(&self, prompt: &ReviewPrompt) -> Result<ReviewResult, ProwlError> {
        let text = self.service.complete(prompt.as_str(), &self.model).await?;
        tracing::debug!(model = %self.model, chars = text.len(), "received completion");
        Ok(ReviewResult::from_text(&text))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    struct Canned {
        reply: Result<String, String>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl Canned {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionService for Canned {
        async fn complete(&self, prompt: &str, model: &str) -> Result<String, ProwlError> {
            self.seen
                .lock()
                .unwrap()
                .push((prompt.to_string(), model.to_string()));
            self.reply.clone().map_err(ProwlError::Service)
        }
    }

    #[tokio::test]
    async fn splits_response_into_lines() {
        let requester = ReviewRequester::new(Canned::ok("A\nB\nC"), "m");
        let result = requester
            .request_review(&ReviewPrompt::new("p".into()))
            .await
            .unwrap();
        assert_eq!(result.lines(), ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn empty_response_gives_empty_result() {
        let requester = ReviewRequester::new(Canned::ok(""), "m");
        let result = requester
            .request_review(&ReviewPrompt::new("p".into()))
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn forwards_prompt_and_model() {
        let requester = ReviewRequester::new(Canned::ok("ok"), "llama3-8b-8192");
        requester
            .request_review(&ReviewPrompt::new("the prompt".into()))
            .await
            .unwrap();
        let seen = requester.service().seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            [("the prompt".to_string(), "llama3-8b-8192".to_string())]
        );
    }

    #[tokio::test]
    async fn service_failure_propagates() {
        let requester = ReviewRequester::new(
            Canned {
                reply: Err("503 Service Unavailable: busy".into()),
                seen: Mutex::new(Vec::new()),
            },
            "m",
        );
        let err = requester
            .request_review(&ReviewPrompt::new("p".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ProwlError::Service(msg) if msg.contains("503")));
    }
}
