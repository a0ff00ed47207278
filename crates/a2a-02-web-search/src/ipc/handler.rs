//! `perform_search` handler.
//!
//! The payload carries a [`SearchRequest`] plus an optional
//! `callback_service`. When present, the results are forwarded to that
//! service as an `aggregate_web_results` message for the request's
//! session; otherwise the search produces no outbound messages.

use crate::service::WebSearchService;
use async_trait::async_trait;
use shared_bus::{HandlerError, MessageHandler, Outbound, ServiceActor};
use shared_types::{AggregateRequest, Envelope, MessageKind, SearchRequest};
use tracing::info;

/// Payload key naming the service that receives the results.
pub const CALLBACK_FIELD: &str = "callback_service";

/// Session used when the request names none.
pub const DEFAULT_SESSION: &str = "default";

pub struct PerformSearchHandler {
    service: WebSearchService,
}

impl PerformSearchHandler {
    pub fn new(service: WebSearchService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageHandler for PerformSearchHandler {
    async fn handle(&self, envelope: &Envelope) -> Result<Vec<Outbound>, HandlerError> {
        let request: SearchRequest = envelope.decode()?;
        let callback: Option<String> = envelope.field(CALLBACK_FIELD).ok();

        let response = self.service.search(&request).await;
        info!(
            sender = %envelope.sender,
            results = response.total_results,
            "[web-search] perform_search handled"
        );

        let Some(callback) = callback else {
            return Ok(Vec::new());
        };
        let aggregate = AggregateRequest {
            session_id: request
                .session_id
                .unwrap_or_else(|| DEFAULT_SESSION.to_string()),
            results: response.results,
            insights: Vec::new(),
        };
        Ok(vec![Outbound::typed(
            callback,
            MessageKind::AggregateResults,
            &aggregate,
        )?])
    }
}

/// Installs every search handler on `actor`.
pub fn register_handlers(actor: &ServiceActor, service: WebSearchService) {
    actor.register_handler(MessageKind::PerformSearch, PerformSearchHandler::new(service));
}
