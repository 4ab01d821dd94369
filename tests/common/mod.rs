#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rxios::{async_trait, Client, Transport, TransportError, TransportRequest, TransportResponse};

type Reply = Box<dyn Fn(&TransportRequest) -> Result<TransportResponse, TransportError> + Send + Sync>;

/// In-memory transport that answers from a closure and records every request
pub struct ScriptedTransport {
    reply: Reply,
    delay: Option<Duration>,
    sent: Arc<Mutex<Vec<TransportRequest>>>,
    events: Events,
}

impl ScriptedTransport {
    pub fn new<F>(reply: F) -> Self
    where
        F: Fn(&TransportRequest) -> Result<TransportResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            reply: Box::new(reply),
            delay: None,
            sent: Arc::new(Mutex::new(Vec::new())),
            events: Events::new(),
        }
    }

    /// Always answer with the given status and body
    pub fn status(status: u16, body: &'static str) -> Self {
        Self::new(move |_| Ok(TransportResponse::new(status).body(body)))
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Record a `dispatch` event into a shared log on every send
    pub fn events(mut self, events: &Events) -> Self {
        self.events = events.clone();
        self
    }

    pub fn sent(&self) -> Arc<Mutex<Vec<TransportRequest>>> {
        self.sent.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.events.push("dispatch");
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = (self.reply)(&request);
        self.sent.lock().unwrap().push(request);
        reply
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Shared, ordered log of side effects
#[derive(Clone, Default)]
pub struct Events(Arc<Mutex<Vec<String>>>);

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: &str) {
        self.0.lock().unwrap().push(event.to_string());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

/// A client over a scripted transport, returning the transport's request log
pub fn client_with(transport: ScriptedTransport) -> (Client, Arc<Mutex<Vec<TransportRequest>>>) {
    let sent = transport.sent();
    let client = Client::builder()
        .base_url("http://test.local")
        .transport(transport)
        .build();
    (client, sent)
}
