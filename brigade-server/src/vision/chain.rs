//! Ordered provider fallback

use std::sync::Arc;
use std::time::Duration;

use super::{
    GeminiProvider, OllamaProvider, OpenAiProvider, ProviderFailure, VisionError, VisionProvider,
    VisionRequest, VisionVerdict,
};
use crate::config::Config;

/// First successful verdict and who produced it
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub provider: &'static str,
    pub model: String,
    pub verdict: VisionVerdict,
    /// Providers that failed before this one answered
    pub failures: Vec<ProviderFailure>,
}

pub struct VisionChain {
    providers: Vec<Arc<dyn VisionProvider>>,
    timeout: Duration,
}

impl VisionChain {
    pub fn new(providers: Vec<Arc<dyn VisionProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// OpenAI → Gemini → Ollama, skipping providers without credentials
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        let mut providers: Vec<Arc<dyn VisionProvider>> = Vec::new();
        if let Some(key) = &config.openai_api_key {
            providers.push(Arc::new(OpenAiProvider::new(
                config.openai_model.clone(),
                key.clone(),
                client.clone(),
            )));
        }
        if let Some(key) = &config.gemini_api_key {
            providers.push(Arc::new(GeminiProvider::new(
                config.gemini_model.clone(),
                key.clone(),
                client.clone(),
            )));
        }
        if let Some(url) = &config.ollama_url {
            providers.push(Arc::new(OllamaProvider::new(
                config.ollama_model.clone(),
                url,
                client,
            )));
        }
        Self::new(providers, Duration::from_secs(config.vision_timeout_secs))
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Try each provider in order until one returns a verdict
    pub async fn analyze(&self, request: &VisionRequest) -> Result<ChainOutcome, VisionError> {
        if self.providers.is_empty() {
            return Err(VisionError::NoProviders);
        }

        let mut failures = Vec::new();
        for provider in &self.providers {
            let result = match tokio::time::timeout(self.timeout, provider.analyze(request)).await {
                Ok(result) => result,
                Err(_) => Err(VisionError::Timeout(self.timeout.as_secs())),
            };

            match result {
                Ok(verdict) => {
                    tracing::info!(
                        provider = provider.name(),
                        model = provider.model(),
                        score = verdict.score,
                        approved = verdict.approved,
                        failed_before = failures.len(),
                        "Vision review completed"
                    );
                    return Ok(ChainOutcome {
                        provider: provider.name(),
                        model: provider.model().to_string(),
                        verdict,
                        failures,
                    });
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Vision provider failed");
                    failures.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Err(VisionError::AllFailed(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Answer(i32),
        Fail,
        Hang,
    }

    struct FakeProvider {
        name: &'static str,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl VisionProvider for FakeProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn model(&self) -> &str {
            "fake-1"
        }

        async fn analyze(&self, _request: &VisionRequest) -> Result<VisionVerdict, VisionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Answer(score) => Ok(VisionVerdict {
                    approved: score >= 70,
                    score,
                    feedback: format!("{} says {score}", self.name),
                }),
                Behavior::Fail => Err(VisionError::Status {
                    status: 500,
                    body: "boom".into(),
                }),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Err(VisionError::Http("unreachable".into()))
                }
            }
        }
    }

    fn request() -> VisionRequest {
        VisionRequest {
            image: vec![0],
            mime: "image/jpeg".into(),
            instructions: "Task: test".into(),
        }
    }

    fn chain(providers: Vec<Arc<FakeProvider>>) -> VisionChain {
        VisionChain::new(
            providers
                .into_iter()
                .map(|p| p as Arc<dyn VisionProvider>)
                .collect(),
            Duration::from_millis(50),
        )
    }

    #[tokio::test]
    async fn empty_chain_reports_no_providers() {
        let err = chain(vec![]).analyze(&request()).await.unwrap_err();
        assert!(matches!(err, VisionError::NoProviders));
    }

    #[tokio::test]
    async fn first_success_wins() {
        let first = FakeProvider::new("openai", Behavior::Answer(91));
        let second = FakeProvider::new("gemini", Behavior::Answer(10));
        let outcome = chain(vec![first.clone(), second.clone()])
            .analyze(&request())
            .await
            .unwrap();
        assert_eq!(outcome.provider, "openai");
        assert_eq!(outcome.verdict.score, 91);
        assert!(outcome.failures.is_empty());
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_back_in_order() {
        let outcome = chain(vec![
            FakeProvider::new("openai", Behavior::Fail),
            FakeProvider::new("gemini", Behavior::Hang),
            FakeProvider::new("ollama", Behavior::Answer(75)),
        ])
        .analyze(&request())
        .await
        .unwrap();
        assert_eq!(outcome.provider, "ollama");
        assert_eq!(outcome.model, "fake-1");
        let names: Vec<_> = outcome.failures.iter().map(|f| f.provider.as_str()).collect();
        assert_eq!(names, ["openai", "gemini"]);
        assert!(outcome.failures[1].error.contains("timed out"));
    }

    #[tokio::test]
    async fn all_failed_reports_each_provider() {
        let err = chain(vec![
            FakeProvider::new("openai", Behavior::Fail),
            FakeProvider::new("ollama", Behavior::Fail),
        ])
        .analyze(&request())
        .await
        .unwrap_err();
        match err {
            VisionError::AllFailed(failures) => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].provider, "openai");
                assert!(failures[0].error.contains("500"));
                assert_eq!(failures[1].provider, "ollama");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
