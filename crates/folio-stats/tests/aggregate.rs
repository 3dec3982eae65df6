//! Integration tests for `Aggregator` using wiremock HTTP mocks.
//!
//! Each test stands up a local mock server so no real network traffic is
//! made. Scenarios cover manual-only platforms, successful extraction,
//! partial extraction, HTTP and transport failures, slow endpoints, concurrent
//! fan-out, and repeated sweeps.

use std::time::{Duration, Instant};

use folio_core::{
    FallbackRecord, FieldMap, PlatformDescriptor, PlatformResult, StatField, StatValue,
};
use folio_stats::{resolve_platform, Aggregator, StatsClient};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a `StatsClient` for tests: 2-second timeout, descriptive UA.
fn test_client() -> StatsClient {
    StatsClient::new(2, 2, "folio-test/0.1").expect("failed to build test StatsClient")
}

fn fallback(solved: i64, rank: &str, contests: i64) -> FallbackRecord {
    FallbackRecord {
        questions_solved: Some(StatValue::from(solved)),
        rank: Some(StatValue::from(rank)),
        contests: Some(StatValue::from(contests)),
    }
}

fn descriptor(
    name: &str,
    endpoint: Option<String>,
    field_map: FieldMap,
    fallback: FallbackRecord,
) -> PlatformDescriptor {
    PlatformDescriptor {
        name: name.to_string(),
        endpoint,
        field_map,
        fallback,
    }
}

fn leetcode_map() -> FieldMap {
    FieldMap {
        questions_solved: Some("totalSolved".to_string()),
        rank: Some("ranking".to_string()),
        contests: None,
    }
}

// ---------------------------------------------------------------------------
// Manual-only platforms
// ---------------------------------------------------------------------------

#[tokio::test]
async fn manual_only_platform_equals_fallback_without_error() {
    let fb = fallback(150, "Gold Badge", 1);
    let d = descriptor("HackerRank", None, FieldMap::default(), fb.clone());

    let result = resolve_platform(&test_client(), &d).await;

    assert_eq!(result, PlatformResult::seeded(&fb));
    assert!(result.error.is_none());
}

#[tokio::test]
async fn missing_fallback_fields_are_placeholders() {
    let d = descriptor(
        "Sparse",
        None,
        FieldMap::default(),
        FallbackRecord {
            questions_solved: Some(StatValue::from(3)),
            rank: None,
            contests: None,
        },
    );

    let result = resolve_platform(&test_client(), &d).await;

    assert_eq!(result.questions_solved, StatValue::from(3));
    assert!(result.rank.is_placeholder());
    assert!(result.contests.is_placeholder());
}

// ---------------------------------------------------------------------------
// Successful responses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_response_overrides_mapped_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/leetcode"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "success", "totalSolved": 512, "ranking": 150_321})),
        )
        .mount(&server)
        .await;

    let d = descriptor(
        "LeetCode",
        Some(format!("{}/leetcode", server.uri())),
        leetcode_map(),
        fallback(400, "~200k", 13),
    );

    let result = resolve_platform(&test_client(), &d).await;

    assert_eq!(result.questions_solved, StatValue::from(512));
    assert_eq!(result.rank, StatValue::from(150_321));
    assert_eq!(result.contests, StatValue::from(13), "unmapped field keeps fallback");
    assert!(result.error.is_none());
}

#[tokio::test]
async fn partial_extraction_keeps_fallback_for_missing_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/leetcode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ranking": 99_000})))
        .mount(&server)
        .await;

    let d = descriptor(
        "LeetCode",
        Some(format!("{}/leetcode", server.uri())),
        leetcode_map(),
        fallback(400, "~200k", 13),
    );

    let result = resolve_platform(&test_client(), &d).await;

    assert_eq!(result.rank, StatValue::from(99_000));
    assert_eq!(result.questions_solved, StatValue::from(400));
    assert!(result.error.is_none());
}

#[tokio::test]
async fn array_indexed_path_reads_nested_rank() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user.info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "result": [{"handle": "someone", "rank": "specialist", "rating": 1450}]
        })))
        .mount(&server)
        .await;

    let d = descriptor(
        "Codeforces",
        Some(format!("{}/api/user.info", server.uri())),
        FieldMap {
            questions_solved: None,
            rank: Some("result[0].rank".to_string()),
            contests: Some(String::new()),
        },
        fallback(250, "Pupil (1300+)", 1),
    );

    let result = resolve_platform(&test_client(), &d).await;

    assert_eq!(result.rank, StatValue::from("specialist"));
    assert_eq!(result.questions_solved, StatValue::from(250));
    assert_eq!(result.contests, StatValue::from(1));
}

#[tokio::test]
async fn empty_result_array_keeps_fallback_rank() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user.info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
        .mount(&server)
        .await;

    let d = descriptor(
        "Codeforces",
        Some(format!("{}/api/user.info", server.uri())),
        FieldMap {
            rank: Some("result[0].rank".to_string()),
            ..FieldMap::default()
        },
        fallback(250, "Pupil (1300+)", 1),
    );

    let result = resolve_platform(&test_client(), &d).await;

    assert_eq!(result.rank, StatValue::from("Pupil (1300+)"));
    assert!(result.error.is_none(), "extraction misses are not errors");
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn http_500_keeps_fallback_and_records_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gfg"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"totalProblemsSolved": 1})))
        .mount(&server)
        .await;

    let fb = fallback(200, "10233", 3);
    let d = descriptor(
        "GeeksforGeeks",
        Some(format!("{}/gfg", server.uri())),
        FieldMap {
            questions_solved: Some("totalProblemsSolved".to_string()),
            ..FieldMap::default()
        },
        fb.clone(),
    );

    let result = resolve_platform(&test_client(), &d).await;

    let mut expected = PlatformResult::seeded(&fb);
    expected.error = Some("API fetch failed (Status: 500)".to_string());
    assert_eq!(result, expected, "no extraction may happen on a non-2xx body");
}

#[tokio::test]
async fn http_404_records_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let d = descriptor(
        "LeetCode",
        Some(format!("{}/missing-user", server.uri())),
        leetcode_map(),
        fallback(400, "~200k", 13),
    );

    let result = resolve_platform(&test_client(), &d).await;

    assert_eq!(
        result.error.as_deref(),
        Some("API fetch failed (Status: 404)")
    );
    assert_eq!(result.questions_solved, StatValue::from(400));
}

#[tokio::test]
async fn malformed_body_is_a_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/leetcode"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Application Error</html>"))
        .mount(&server)
        .await;

    let fb = fallback(400, "~200k", 13);
    let d = descriptor(
        "LeetCode",
        Some(format!("{}/leetcode", server.uri())),
        leetcode_map(),
        fb.clone(),
    );

    let result = resolve_platform(&test_client(), &d).await;

    assert_eq!(result.error.as_deref(), Some("Failed to fetch data"));
    assert_eq!(result.questions_solved, StatValue::from(400));
    assert_eq!(result.rank, StatValue::from("~200k"));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_fetch_failure() {
    let d = descriptor(
        "LeetCode",
        Some("http://127.0.0.1:1/stats".to_string()),
        leetcode_map(),
        fallback(400, "~200k", 13),
    );

    let result = resolve_platform(&test_client(), &d).await;

    assert_eq!(result.error.as_deref(), Some("Failed to fetch data"));
    assert_eq!(result.get(StatField::QuestionsSolved), &StatValue::from(400));
}

// ---------------------------------------------------------------------------
// Sweeps
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sweep_publishes_every_platform_despite_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalSolved": 10, "ranking": 5})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let descriptors = vec![
        descriptor(
            "Ok",
            Some(format!("{}/ok", server.uri())),
            leetcode_map(),
            fallback(1, "a", 1),
        ),
        descriptor(
            "Broken",
            Some(format!("{}/broken", server.uri())),
            leetcode_map(),
            fallback(2, "b", 2),
        ),
        descriptor("Manual", None, FieldMap::default(), fallback(3, "c", 3)),
    ];

    let stats = Aggregator::new(test_client()).aggregate(&descriptors).await;

    assert_eq!(stats.len(), 3);
    assert_eq!(stats.error_count(), 1);

    let ok = stats.get("Ok").expect("Ok result");
    assert_eq!(ok.questions_solved, StatValue::from(10));
    assert!(ok.error.is_none());

    let broken = stats.get("Broken").expect("Broken result");
    assert_eq!(broken.questions_solved, StatValue::from(2));
    assert_eq!(
        broken.error.as_deref(),
        Some("API fetch failed (Status: 503)")
    );

    let manual = stats.get("Manual").expect("Manual result");
    assert_eq!(manual, &PlatformResult::seeded(&fallback(3, "c", 3)));
}

#[tokio::test]
async fn total_network_failure_still_yields_complete_fallback_mapping() {
    let descriptors = vec![
        descriptor(
            "A",
            Some("http://127.0.0.1:1/a".to_string()),
            leetcode_map(),
            fallback(1, "a", 1),
        ),
        descriptor(
            "B",
            Some("http://127.0.0.1:1/b".to_string()),
            leetcode_map(),
            fallback(2, "b", 2),
        ),
    ];

    let stats = Aggregator::new(test_client()).aggregate(&descriptors).await;

    assert_eq!(stats.len(), 2);
    assert_eq!(stats.error_count(), 2);
    for (name, result) in stats.iter() {
        assert!(!result.questions_solved.is_placeholder(), "{name} lost its fallback");
    }
}

#[tokio::test]
async fn slow_endpoint_times_out_without_affecting_others() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"totalSolved": 999}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalSolved": 42})))
        .mount(&server)
        .await;

    let client = StatsClient::new(1, 1, "folio-test/0.1").expect("client");
    let descriptors = vec![
        descriptor(
            "Slow",
            Some(format!("{}/slow", server.uri())),
            leetcode_map(),
            fallback(7, "slow", 0),
        ),
        descriptor(
            "Fast",
            Some(format!("{}/fast", server.uri())),
            leetcode_map(),
            fallback(1, "fast", 0),
        ),
    ];

    let started = Instant::now();
    let stats = Aggregator::new(client).aggregate(&descriptors).await;
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_secs(5),
        "sweep should be bounded by the request timeout, took {elapsed:?}"
    );

    let fast = stats.get("Fast").expect("Fast result");
    assert_eq!(fast.questions_solved, StatValue::from(42));
    assert!(fast.error.is_none());

    let slow = stats.get("Slow").expect("Slow result");
    assert_eq!(slow.questions_solved, StatValue::from(7));
    assert_eq!(slow.error.as_deref(), Some("Failed to fetch data"));
}

#[tokio::test]
async fn sweep_fetches_platforms_concurrently() {
    const PLATFORMS: u32 = 5;
    const DELAY: Duration = Duration::from_millis(800);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"totalSolved": 5, "ranking": 9}))
                .set_delay(DELAY),
        )
        .expect(u64::from(PLATFORMS))
        .mount(&server)
        .await;

    let descriptors: Vec<PlatformDescriptor> = (0..PLATFORMS)
        .map(|i| {
            descriptor(
                &format!("P{i}"),
                Some(format!("{}/p{i}", server.uri())),
                leetcode_map(),
                fallback(0, "none", 0),
            )
        })
        .collect();

    let started = Instant::now();
    let stats = Aggregator::new(test_client()).aggregate(&descriptors).await;
    let elapsed = started.elapsed();

    assert!(
        elapsed < DELAY * 3,
        "requests should overlap; {PLATFORMS} delayed fetches took {elapsed:?}"
    );
    assert_eq!(stats.len(), PLATFORMS as usize);
    assert_eq!(stats.error_count(), 0);
    for (name, result) in stats.iter() {
        assert_eq!(result.questions_solved, StatValue::from(5), "{name}");
    }
}

#[tokio::test]
async fn repeated_sweeps_are_identical_and_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/leetcode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalSolved": 77, "ranking": 3})))
        .expect(2)
        .mount(&server)
        .await;

    let descriptors = vec![
        descriptor(
            "LeetCode",
            Some(format!("{}/leetcode", server.uri())),
            leetcode_map(),
            fallback(400, "~200k", 13),
        ),
        descriptor("HackerRank", None, FieldMap::default(), fallback(150, "Gold", 1)),
    ];

    let aggregator = Aggregator::new(test_client());
    let first = aggregator.aggregate(&descriptors).await;
    let second = aggregator.aggregate(&descriptors).await;

    assert_eq!(first, second);
    // `expect(2)` is verified when the mock server drops: no caching between sweeps.
}
