//! Envelope handlers.
//!
//! `generate_web_report` answers with `web_report_ready` carrying a
//! [`ReportResponse`], addressed to the payload's `reply_to` or, by
//! default, to the envelope's sender. The other two kinds only mutate
//! session state.

use crate::domain::AggregationError;
use crate::service::AggregationService;
use shared_bus::{handler_fn, HandlerError, Outbound, ServiceActor};
use shared_types::{
    AggregateRequest, Envelope, MessageKind, ReportRequest, ReportResponse, SessionRequest,
};
use tracing::info;

pub const REPLY_TO_FIELD: &str = "reply_to";

impl From<AggregationError> for HandlerError {
    fn from(err: AggregationError) -> Self {
        HandlerError::NotFound(err.to_string())
    }
}

fn start_session(service: &AggregationService, envelope: &Envelope) -> Result<Vec<Outbound>, HandlerError> {
    let request: SessionRequest = envelope.decode()?;
    service.start_session(request);
    Ok(Vec::new())
}

fn aggregate(service: &AggregationService, envelope: &Envelope) -> Result<Vec<Outbound>, HandlerError> {
    let request: AggregateRequest = envelope.decode()?;
    let ack = service.aggregate(request)?;
    info!(sender = %envelope.sender, total = ack.total_results, "[research-aggregation] aggregate handled");
    Ok(Vec::new())
}

fn report(service: &AggregationService, envelope: &Envelope) -> Result<Vec<Outbound>, HandlerError> {
    let request: ReportRequest = envelope.decode()?;
    let report = service.report(&request.session_id)?;
    let reply_to: String = envelope
        .field(REPLY_TO_FIELD)
        .unwrap_or_else(|_| envelope.sender.clone());
    Ok(vec![Outbound::typed(
        reply_to,
        MessageKind::ReportReady,
        &ReportResponse { report },
    )?])
}

type SyncHandler = fn(&AggregationService, &Envelope) -> Result<Vec<Outbound>, HandlerError>;

pub fn register_handlers(actor: &ServiceActor, service: AggregationService) {
    let table: [(MessageKind, SyncHandler); 3] = [
        (MessageKind::StartResearchSession, start_session),
        (MessageKind::AggregateResults, aggregate),
        (MessageKind::GenerateReport, report),
    ];
    for (kind, handle) in table {
        let service = service.clone();
        actor.register_handler(
            kind,
            handler_fn(move |envelope: Envelope| {
                let service = service.clone();
                async move { handle(&service, &envelope) }
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_bus::DispatchError;
    use shared_types::AuthCodec;

    fn setup() -> (ServiceActor, AggregationService) {
        let service = AggregationService::new();
        let actor = ServiceActor::new("research-aggregation", AuthCodec::new("k"));
        register_handlers(&actor, service.clone());
        (actor, service)
    }

    fn message(actor: &ServiceActor, kind: MessageKind, body: serde_json::Value) -> Envelope {
        let mut env = actor.create_message("research-aggregation", kind.payload(body));
        env.sender = "research-client".into();
        env
    }

    #[tokio::test]
    async fn test_session_then_report_replies_to_sender() {
        let (actor, service) = setup();
        actor
            .dispatch_one(&message(
                &actor,
                MessageKind::StartResearchSession,
                json!({"topic": "quantum", "session_id": "s-1"}),
            ))
            .await
            .unwrap();
        actor
            .dispatch_one(&message(
                &actor,
                MessageKind::AggregateResults,
                json!({"session_id": "s-1", "results": [{"id": "1", "title": "a", "url": "https://arxiv.org/1"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(service.session("s-1").unwrap().sources_analyzed, 1);

        let out = actor
            .dispatch_one(&message(&actor, MessageKind::GenerateReport, json!({"session_id": "s-1"})))
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].recipient, "research-client");
        assert_eq!(out[0].sender, "research-aggregation");
        let ready: ReportResponse = out[0].decode().unwrap();
        assert_eq!(ready.report.session_id, "s-1");
        assert_eq!(ready.report.total_sources, 1);
    }

    #[tokio::test]
    async fn test_reply_to_overrides_sender() {
        let (actor, service) = setup();
        service.start_session(SessionRequest {
            topic: "t".into(),
            session_id: Some("s".into()),
        });
        let out = actor
            .dispatch_one(&message(
                &actor,
                MessageKind::GenerateReport,
                json!({"session_id": "s", "reply_to": "dashboard"}),
            ))
            .await
            .unwrap();
        assert_eq!(out[0].recipient, "dashboard");
    }

    #[tokio::test]
    async fn test_unknown_session_is_handler_failure() {
        let (actor, _) = setup();
        let err = actor
            .dispatch_one(&message(&actor, MessageKind::GenerateReport, json!({"session_id": "ghost"})))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Handler {
                source: HandlerError::NotFound(_),
                ..
            }
        ));
    }
}
