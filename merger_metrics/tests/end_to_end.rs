use merger_core::{GatewayConfig, MergerError, Mesh, PrometheusSource, SourceConfig};
use merger_metrics::{MeshMerger, PushGateway};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

// Helper: answer one PromQL expression with an instant vector.
async fn answer(server: &mut ServerGuard, expr: &str, result: serde_json::Value) -> Mock {
    server
        .mock("GET", "/api/v1/query")
        .match_query(Matcher::UrlEncoded("query".into(), expr.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"status": "success", "data": {"resultType": "vector", "result": result}})
                .to_string(),
        )
        .create_async()
        .await
}

fn sample(labels: serde_json::Value, value: &str) -> serde_json::Value {
    json!({"metric": labels, "value": [1587994592.5, value]})
}

// Helper: a merger wired to mockito servers standing in for Prometheus and the push gateway.
fn merger(prometheus: &ServerGuard, gateway: &ServerGuard) -> MeshMerger {
    let source = PrometheusSource::new(SourceConfig {
        url: prometheus.url(),
        timeout: Some(Duration::from_secs(5)),
    })
    .unwrap();
    let sink = PushGateway::new(GatewayConfig {
        address: gateway.host_with_port(),
        instance: "emojivoto".to_string(),
        timeout: Some(Duration::from_secs(5)),
    })
    .unwrap();
    MeshMerger::new(Arc::new(source), Arc::new(sink))
}

async fn scenario(prometheus: &mut ServerGuard, rate_r2: Option<&str>) -> Vec<Mock> {
    let mut mocks = vec![
        answer(
            prometheus,
            r#"wrk2_benchmark_progress{status="done",exported_job="bare-metal"}"#,
            json!([
                sample(json!({"run": "r1", "status": "done"}), "100"),
                sample(json!({"run": "r2", "status": "done"}), "100"),
            ]),
        )
        .await,
        answer(
            prometheus,
            r#"wrk2_benchmark_latency_ms{run="r1"}"#,
            json!([
                sample(json!({"run": "r1", "p": "50.0"}), "10"),
                sample(json!({"run": "r1", "p": "99.0"}), "50"),
            ]),
        )
        .await,
        answer(
            prometheus,
            r#"wrk2_benchmark_latency_ms{run="r2"}"#,
            json!([
                sample(json!({"run": "r2", "p": "50.0"}), "12"),
                sample(json!({"run": "r2", "p": "99.0"}), "40"),
            ]),
        )
        .await,
        answer(prometheus, r#"wrk2_benchmark_latency_detailed_ms{run="r1"}"#, json!([])).await,
        answer(prometheus, r#"wrk2_benchmark_latency_detailed_ms{run="r2"}"#, json!([])).await,
        answer(
            prometheus,
            r#"wrk2_benchmark_run_requested_rps{run="r1",exported_job="bare-metal"}"#,
            json!([sample(json!({"run": "r1"}), "1000")]),
        )
        .await,
    ];

    let r2 = match rate_r2 {
        Some(rate) => json!([sample(json!({"run": "r2"}), rate)]),
        None => json!([]),
    };
    mocks.push(
        answer(
            prometheus,
            r#"wrk2_benchmark_run_requested_rps{run="r2",exported_job="bare-metal"}"#,
            r2,
        )
        .await,
    );
    mocks
}

#[tokio::test]
async fn test_bare_metal_summary_is_pushed() {
    let mut prometheus = mockito::Server::new_async().await;
    let mut gateway = mockito::Server::new_async().await;
    let _answers = scenario(&mut prometheus, Some("2000")).await;

    let push = gateway
        .mock("PUT", "/metrics/job/bare-metal/instance/emojivoto")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"p="99.0",requested_rps="2000",source_run="r2"\} 40"#.to_string()),
            Matcher::Regex(r#"p="50.0",requested_rps="1000",source_run="r1"\} 10"#.to_string()),
        ]))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let report = merger(&prometheus, &gateway)
        .merge_mesh(&Mesh::from("bare-metal"))
        .await
        .unwrap();

    let coarse = &report.resolutions[0];
    assert_eq!(coarse.percentiles, 2);
    assert_eq!(coarse.observations, 4);
    assert_eq!(coarse.runs, 2);
    assert_eq!(report.resolutions[1].observations, 0);
    push.assert_async().await;
}

#[tokio::test]
async fn test_missing_rate_aborts_before_push() {
    let mut prometheus = mockito::Server::new_async().await;
    let mut gateway = mockito::Server::new_async().await;
    let _answers = scenario(&mut prometheus, None).await;

    let push = gateway
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = merger(&prometheus, &gateway)
        .merge_mesh(&Mesh::from("bare-metal"))
        .await
        .unwrap_err();

    assert!(matches!(err, MergerError::MissingRate { ref run, .. } if run == "r2"));
    push.assert_async().await;
}
