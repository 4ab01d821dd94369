use std::sync::Arc;

use tracing::trace;

use crate::config::RequestConfig;
use crate::dispatch::dispatch_request;
use crate::error::Result;
use crate::interceptor::{Interceptor, Interceptors};
use crate::response::Response;
use crate::transport::Transport;

/// The steps one request runs through
///
/// Built from snapshots of the registries, so later `add`/`eject` calls do
/// not affect a chain that already exists. Request interceptors run most
/// recently registered first, then the dispatch step, then response
/// interceptors in registration order.
pub struct ExecutionChain {
    request: Vec<Arc<dyn Interceptor<RequestConfig>>>,
    transport: Arc<dyn Transport>,
    response: Vec<Arc<dyn Interceptor<Response>>>,
}

impl ExecutionChain {
    /// Build the chain for one request
    pub fn build(interceptors: &Interceptors, transport: Arc<dyn Transport>) -> Self {
        let mut request = interceptors.request.snapshot();
        request.reverse();
        let response = interceptors.response.snapshot();

        Self {
            request,
            transport,
            response,
        }
    }

    /// Number of steps, dispatch included; never zero
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.request.len() + 1 + self.response.len()
    }

    /// Step names in execution order, the dispatch step reported as `dispatch`
    pub fn step_names(&self) -> Vec<String> {
        self.request
            .iter()
            .map(|step| step.name().to_string())
            .chain(std::iter::once("dispatch".to_string()))
            .chain(self.response.iter().map(|step| step.name().to_string()))
            .collect()
    }

    /// Run every step in order, starting from `config`
    pub async fn run(self, config: RequestConfig) -> Result<Response> {
        let config = run_stage(&self.request, Ok(config)).await;

        // the dispatch step has no rejection handler
        let response = match config {
            Ok(config) => {
                trace!(step = "dispatch", "running chain step");
                dispatch_request(config, self.transport.as_ref()).await
            }
            Err(error) => Err(error),
        };

        run_stage(&self.response, response).await
    }
}

async fn run_stage<T: Send + 'static>(steps: &[Arc<dyn Interceptor<T>>], initial: Result<T>) -> Result<T> {
    let mut outcome = initial;
    for step in steps {
        trace!(step = step.name(), rejected = outcome.is_err(), "running chain step");
        outcome = match outcome {
            Ok(value) => step.on_fulfilled(value).await,
            Err(error) => step.on_rejected(error).await,
        };
    }
    outcome
}
