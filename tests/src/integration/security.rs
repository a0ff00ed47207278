//! # Request Authentication Tests
//!
//! Every collaborator endpoint except `/health` requires the
//! `X-Service-Name`, `X-Timestamp` and `X-Signature` headers, signed over
//! the exact body with the shared secret.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use shared_transport::SignedClient;
    use shared_types::{current_timestamp, AuthCodec, ServiceRole, MAX_CLOCK_SKEW_SECS};

    use crate::integration::harness::Cluster;

    const CALL_TIMEOUT: Duration = Duration::from_secs(5);

    async fn post_with_headers(
        url: &str,
        body: &[u8],
        headers: &[(&'static str, &str)],
    ) -> reqwest::StatusCode {
        let mut request = reqwest::Client::new()
            .post(url)
            .header("content-type", "application/json")
            .body(body.to_vec());
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        request.send().await.unwrap().status()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_signed_request_accepted() {
        let mut cluster = Cluster::start().await;
        let base = cluster.serve(ServiceRole::WebSearch).await;

        let client = SignedClient::new("research-client", cluster.config.codec()).unwrap();
        let response = client
            .post_json(
                &format!("{base}/search"),
                &json!({ "query_text": "rust", "max_results": 2 }),
                CALL_TIMEOUT,
            )
            .await
            .unwrap();
        assert!(response.is_success(), "status {}", response.status);

        cluster.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unsigned_and_stale_requests_rejected() {
        let mut cluster = Cluster::start().await;
        let base = cluster.serve(ServiceRole::WebSearch).await;
        let url = format!("{base}/search");
        let body = serde_json::to_vec(&json!({ "query_text": "rust" })).unwrap();

        assert_eq!(post_with_headers(&url, &body, &[]).await, 401);

        let stale = cluster.config.codec().auth_headers_at(
            "research-client",
            &body,
            current_timestamp() - MAX_CLOCK_SKEW_SECS - 5,
        );
        assert_eq!(post_with_headers(&url, &body, &stale.pairs()).await, 401);

        // Signed for a different body.
        let fresh = cluster.config.codec().auth_headers("research-client", b"{}");
        assert_eq!(post_with_headers(&url, &body, &fresh.pairs()).await, 401);

        let fresh = cluster.config.codec().auth_headers("research-client", &body);
        assert_eq!(post_with_headers(&url, &body, &fresh.pairs()).await, 200);

        cluster.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_wrong_secret_rejected_but_health_open() {
        let mut cluster = Cluster::start().await;
        let base = cluster.serve(ServiceRole::ResearchAggregation).await;

        let intruder = SignedClient::new("research-client", AuthCodec::new("guessed")).unwrap();
        let response = intruder
            .post_json(&format!("{base}/session"), &json!({ "topic": "secrets" }), CALL_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(response.status, 401);
        assert!(cluster.container.aggregation.list().sessions.is_empty());

        let health = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(health.status(), 200);

        cluster.shutdown().await;
    }
}
