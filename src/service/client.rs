//! @ai:module:intent Classifier collaborator: turns strokes into ranked raw answers
//! @ai:module:layer infrastructure
//! @ai:module:public_api Classifier, HttpClassifier, ScriptedClassifier
//! @ai:module:stateless false

use crate::answer::{Answer, AnswerAggregator};
use crate::corpus::Strokes;
use crate::error::{Error, Result};
use crate::mapping::Mapping;
use crate::service::protocol::{DetexifyRequest, HwrtRequest};
use crate::service::{Protocol, Service};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A request still pending after this long is a transport failure.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// @ai:intent Trait for recognizer clients
#[allow(async_fn_in_trait)]
pub trait Classifier: Send + Sync {
    /// @ai:intent Request one vanilla (un-projected) classification
    /// @ai:post Err is ClassifierUnavailable on any non-success response
    async fn classify(&self, service: &Service, strokes: &Strokes) -> Result<Vec<Answer>>;

    /// @ai:intent Classify, then merge the answers into the classes of `mapping`
    /// @ai:effects network
    async fn classify_projected(
        &self,
        service: &Service,
        mapping: &Mapping,
        strokes: &Strokes,
        bound: usize,
    ) -> Result<Vec<Answer>> {
        let raw = self.classify(service, strokes).await?;
        AnswerAggregator::new().aggregate(service, mapping, &raw, bound, false)
    }
}

/// @ai:intent HTTP client speaking each recognizer's protocol
pub struct HttpClassifier {
    client: reqwest::Client,
}

impl HttpClassifier {
    /// @ai:intent Create a new HTTP classifier
    /// @ai:effects pure
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::ClassifierUnavailable {
                service: "http".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

impl Classifier for HttpClassifier {
    /// @ai:intent Send strokes to the recognizer and decode its ranking
    /// @ai:effects network
    async fn classify(&self, service: &Service, strokes: &Strokes) -> Result<Vec<Answer>> {
        let unavailable = |reason: String| Error::ClassifierUnavailable {
            service: service.name().to_string(),
            reason,
        };

        let request = self.client.post(&service.config.url);
        let request = match service.protocol() {
            Protocol::Hwrt => request.form(&HwrtRequest::new(strokes)?),
            Protocol::Detexify => request.json(&DetexifyRequest::new(strokes)),
        };

        let response = request
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(unavailable(format!("status {}: {}", status, error_text)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        service.protocol().extract_answers(service.name(), &body)
    }
}

/// @ai:intent Test double replaying a fixed sequence of responses
///            `None` entries simulate an unavailable recognizer
pub struct ScriptedClassifier {
    responses: Mutex<VecDeque<Option<Vec<Answer>>>>,
    calls: Mutex<usize>,
}

impl ScriptedClassifier {
    pub fn new(responses: Vec<Option<Vec<Answer>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(0),
        }
    }

    /// @ai:intent Number of classification requests received so far
    pub fn calls(&self) -> usize {
        self.calls.lock().map(|c| *c).unwrap_or_default()
    }
}

impl Classifier for ScriptedClassifier {
    async fn classify(&self, service: &Service, _strokes: &Strokes) -> Result<Vec<Answer>> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }

        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());

        match next {
            Some(Some(answers)) => Ok(answers),
            Some(None) => Err(Error::ClassifierUnavailable {
                service: service.name().to_string(),
                reason: "scripted failure".to_string(),
            }),
            None => Err(Error::ClassifierUnavailable {
                service: service.name().to_string(),
                reason: "no scripted response left".to_string(),
            }),
        }
    }
}
