//! Mock assist backend for deterministic testing.
//!
//! Always compiled so the server can run credential-less and tests never
//! touch the network.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use eventra_assist::MockAssistBackend;
//!
//! let backend = MockAssistBackend::new()
//!     .with_fixed_response(r#"{"recommended_venue_ids": []}"#);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use eventra_core::{AssistBackend, Error, Result};

/// Mock assist backend for testing and credential-less deployments.
#[derive(Clone)]
pub struct MockAssistBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<String>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    /// Responses keyed by a substring of the prompt.
    mapped_responses: HashMap<String, String>,
    default_response: String,
    fail_always: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            mapped_responses: HashMap::new(),
            default_response: "{}".to_string(),
            fail_always: false,
        }
    }
}

impl MockAssistBackend {
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the response returned for every prompt without a mapping.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Return `output` for any prompt containing `needle`.
    pub fn with_response_mapping(
        mut self,
        needle: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .mapped_responses
            .insert(needle.into(), output.into());
        self
    }

    /// Make every call fail, for exercising fallback paths.
    pub fn with_failure(mut self) -> Self {
        Arc::make_mut(&mut self.config).fail_always = true;
        self
    }

    /// Prompts received so far, in call order.
    pub fn get_calls(&self) -> Vec<String> {
        self.call_log.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }
}

impl Default for MockAssistBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssistBackend for MockAssistBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.call_log.lock().unwrap().push(prompt.to_string());

        if self.config.fail_always {
            return Err(Error::Inference("mock backend failure".to_string()));
        }

        for (needle, output) in &self.config.mapped_responses {
            if prompt.contains(needle.as_str()) {
                return Ok(output.clone());
            }
        }
        Ok(self.config.default_response.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
