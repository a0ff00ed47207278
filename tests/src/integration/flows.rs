//! # Actor Flow Tests
//!
//! Collaborators as actors behind one [`shared_bus::LocalRouter`]:
//!
//! 1. **Ordering**: two envelopes from one sender are handled in send order
//! 2. **Fault Isolation**: a failing handler does not stop the dispatch loop
//! 3. **Envelope Authentication**: envelopes sealed with another secret are dropped

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::{json, Value};
    use shared_bus::{handler_fn, LocalRouter, Outbound, ServiceActor};
    use shared_types::{
        AggregateRequest, AuthCodec, Envelope, MessageKind, ServiceRole, DEV_SHARED_SECRET,
    };
    use tokio::sync::{mpsc, watch};
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    use node_runtime::container::{RuntimeConfig, ServiceContainer};

    const POLL: Duration = Duration::from_millis(20);
    const WAIT: Duration = Duration::from_secs(5);

    fn codec() -> AuthCodec {
        AuthCodec::new(DEV_SHARED_SECRET)
    }

    /// An actor that forwards every envelope of `kinds` to a channel.
    fn recorder(name: &str, kinds: &[MessageKind]) -> (Arc<ServiceActor>, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = Arc::new(ServiceActor::new(name, codec()).with_poll_interval(POLL));
        for kind in kinds {
            let tx = tx.clone();
            actor.register_handler(
                *kind,
                handler_fn(move |envelope: Envelope| {
                    let tx = tx.clone();
                    async move {
                        let _ = tx.send(envelope);
                        Ok(Vec::<Outbound>::new())
                    }
                }),
            );
        }
        (actor, rx)
    }

    struct Running {
        shutdown: watch::Sender<bool>,
        actors: Vec<Arc<ServiceActor>>,
        tasks: Vec<JoinHandle<()>>,
    }

    impl Running {
        fn start(router: Arc<LocalRouter>, actors: Vec<Arc<ServiceActor>>) -> Self {
            let (shutdown, rx) = watch::channel(false);
            let mut tasks = vec![tokio::spawn(async move { router.run(rx).await })];
            for actor in &actors {
                let actor = actor.clone();
                tasks.push(tokio::spawn(async move {
                    actor.run().await.unwrap();
                }));
            }
            Self {
                shutdown,
                actors,
                tasks,
            }
        }

        async fn stop(self) {
            for actor in &self.actors {
                actor.stop();
            }
            self.shutdown.send_replace(true);
            for task in self.tasks {
                task.await.unwrap();
            }
        }
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Envelope>) -> Envelope {
        timeout(WAIT, rx.recv()).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_envelopes_handled_in_send_order() {
        let router = Arc::new(LocalRouter::new());
        let client = Arc::new(ServiceActor::new("research-client", codec()));
        let (sink, mut received) = recorder(
            "research-aggregation",
            &[MessageKind::AggregateResults, MessageKind::GenerateReport],
        );
        router.attach(client.clone());
        router.attach(sink.clone());

        client
            .emit(
                "research-aggregation",
                MessageKind::AggregateResults.payload(json!({ "session_id": "s-1" })),
            )
            .unwrap();
        client
            .emit(
                "research-aggregation",
                MessageKind::GenerateReport.payload(json!({ "session_id": "s-1" })),
            )
            .unwrap();

        let running = Running::start(router, vec![sink]);
        let first = next(&mut received).await;
        let second = next(&mut received).await;
        assert_eq!(first.kind().unwrap(), MessageKind::AggregateResults);
        assert_eq!(second.kind().unwrap(), MessageKind::GenerateReport);
        running.stop().await;
    }

    #[tokio::test]
    async fn test_failed_handler_keeps_loop_running() {
        let container = ServiceContainer::new(&RuntimeConfig::default()).unwrap();
        let router = Arc::new(LocalRouter::new());
        let search = Arc::new(
            container
                .actor(ServiceRole::WebSearch)
                .with_poll_interval(POLL),
        );
        let (client, mut replies) = recorder("research-client", &[MessageKind::AggregateResults]);
        router.attach(search.clone());
        router.attach(client.clone());

        // Missing query_text: the handler rejects the payload.
        let mut broken = MessageKind::PerformSearch.payload(json!({ "max_results": 2 }));
        broken.insert("callback_service".into(), Value::from("research-client"));
        client.emit("web-search", broken).unwrap();

        let mut valid = MessageKind::PerformSearch.payload(json!({
            "query_text": "distributed systems",
            "max_results": 2,
            "session_id": "s-2",
        }));
        valid.insert("callback_service".into(), Value::from("research-client"));
        client.emit("web-search", valid).unwrap();

        let running = Running::start(router, vec![search.clone(), client]);
        let reply: AggregateRequest = next(&mut replies).await.decode().unwrap();
        assert_eq!(reply.session_id, "s-2");
        assert!(!reply.results.is_empty());

        let stats = search.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.handled, 1);
        running.stop().await;
    }

    #[tokio::test]
    async fn test_envelope_from_other_secret_dropped() {
        let container = ServiceContainer::new(&RuntimeConfig::default()).unwrap();
        let aggregation = container.actor(ServiceRole::ResearchAggregation);
        let outsider = ServiceActor::new("research-client", AuthCodec::new("not-the-shared-secret"));

        let envelope = outsider.create_message(
            "research-aggregation",
            MessageKind::StartResearchSession.payload(json!({ "topic": "intrusion" })),
        );
        assert!(!aggregation.receive(envelope));
        assert_eq!(aggregation.pending(), 0);
        assert_eq!(aggregation.stats().rejected, 1);

        let insider = ServiceActor::new("research-client", codec());
        let envelope = insider.create_message(
            "research-aggregation",
            MessageKind::StartResearchSession.payload(json!({ "topic": "welcome" })),
        );
        assert!(aggregation.receive(envelope));
        assert_eq!(aggregation.pending(), 1);
    }
}
