//! Envelope handlers.
//!
//! | Kind | Outbound |
//! |---|---|
//! | `extract_web_insights` | `aggregate_web_results` with the insights, when `callback_service` and `session_id` are set |
//! | `analyze_source_credibility` | none |
//! | `identify_research_trends` | none |

use crate::service::KnowledgeService;
use shared_bus::{handler_fn, HandlerError, Outbound, ServiceActor};
use shared_types::{AggregateRequest, Envelope, ExtractionRequest, MessageKind};
use tracing::info;

pub const CALLBACK_FIELD: &str = "callback_service";
pub const SESSION_FIELD: &str = "session_id";

fn extract(service: &KnowledgeService, envelope: &Envelope) -> Result<Vec<Outbound>, HandlerError> {
    let request: ExtractionRequest = envelope.decode()?;
    let batch = service.extract(&request.search_results);

    let callback: Option<String> = envelope.field(CALLBACK_FIELD).ok();
    let session: Option<String> = envelope.field(SESSION_FIELD).ok();
    match (callback, session) {
        (Some(callback), Some(session_id)) => Ok(vec![Outbound::typed(
            callback,
            MessageKind::AggregateResults,
            &AggregateRequest {
                session_id,
                results: Vec::new(),
                insights: batch.insights,
            },
        )?]),
        _ => Ok(Vec::new()),
    }
}

fn credibility(service: &KnowledgeService, envelope: &Envelope) -> Result<Vec<Outbound>, HandlerError> {
    let request: ExtractionRequest = envelope.decode()?;
    let analysis = service.credibility(&request.search_results);
    info!(sender = %envelope.sender, high = analysis.high_credibility, "[knowledge-extraction] Credibility handled");
    Ok(Vec::new())
}

fn trends(service: &KnowledgeService, envelope: &Envelope) -> Result<Vec<Outbound>, HandlerError> {
    let request: ExtractionRequest = envelope.decode()?;
    let report = service.trends(&request.search_results);
    info!(sender = %envelope.sender, trends = ?report.trends, "[knowledge-extraction] Trends handled");
    Ok(Vec::new())
}

type SyncHandler = fn(&KnowledgeService, &Envelope) -> Result<Vec<Outbound>, HandlerError>;

/// Installs the three knowledge handlers on `actor`.
pub fn register_handlers(actor: &ServiceActor, service: KnowledgeService) {
    let table: [(MessageKind, SyncHandler); 3] = [
        (MessageKind::ExtractInsights, extract),
        (MessageKind::AnalyzeCredibility, credibility),
        (MessageKind::IdentifyTrends, trends),
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
    use shared_types::AuthCodec;

    fn setup() -> (ServiceActor, KnowledgeService) {
        let service = KnowledgeService::new().unwrap();
        let actor = ServiceActor::new("knowledge-extraction", AuthCodec::new("k"));
        register_handlers(&actor, service.clone());
        (actor, service)
    }

    fn results() -> serde_json::Value {
        json!([{"id": "1", "title": "Quantum networks", "url": "https://www.nature.com/a", "snippet": "novel"}])
    }

    #[tokio::test]
    async fn test_all_kinds_registered() {
        let (actor, _) = setup();
        for kind in [
            MessageKind::ExtractInsights,
            MessageKind::AnalyzeCredibility,
            MessageKind::IdentifyTrends,
        ] {
            assert!(actor.handles(kind));
        }
    }

    #[tokio::test]
    async fn test_extract_forwards_insights() {
        let (actor, service) = setup();
        let env = actor.create_message(
            "knowledge-extraction",
            MessageKind::ExtractInsights.payload(json!({
                "search_results": results(),
                "session_id": "s-9",
                "callback_service": "research-aggregation",
            })),
        );
        let out = actor.dispatch_one(&env).await.unwrap();
        assert_eq!(out.len(), 1);
        let forwarded: AggregateRequest = out[0].decode().unwrap();
        assert_eq!(forwarded.session_id, "s-9");
        assert!(forwarded.results.is_empty());
        assert_eq!(forwarded.insights.len(), service.stats().total_insights);
    }

    #[tokio::test]
    async fn test_credibility_and_trends_have_no_outbound() {
        let (actor, _) = setup();
        for kind in [MessageKind::AnalyzeCredibility, MessageKind::IdentifyTrends] {
            let env = actor.create_message(
                "knowledge-extraction",
                kind.payload(json!({"search_results": results()})),
            );
            assert!(actor.dispatch_one(&env).await.unwrap().is_empty());
        }
    }
}
