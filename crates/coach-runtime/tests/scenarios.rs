//! End-to-end pipeline scenarios with a mock provider and local evidence

use std::sync::Arc;
use std::time::{Duration, Instant};

use coach_core::feedback::{MAX_SCORE, MIN_SCORE};
use coach_core::{CoachError, DebateTurn, EvidenceItem, Sender, SessionStore};
use coach_evidence::{EvidenceFetcher, SerpApiSource, StaticSource};
use coach_llm::MockProvider;
use coach_runtime::{CompletionRequester, DebateCoach};

fn coach_with(llm: MockProvider, fetcher: EvidenceFetcher) -> DebateCoach {
    DebateCoach::new(
        CompletionRequester::new(Arc::new(llm), Duration::from_secs(10)),
        fetcher,
        3,
        Arc::new(SessionStore::new()),
    )
}

fn static_evidence(items: Vec<EvidenceItem>) -> EvidenceFetcher {
    EvidenceFetcher::new(Arc::new(StaticSource::new(items)), Duration::from_secs(1))
}

fn remote_work(message: &str) -> DebateTurn {
    DebateTurn::from_parts(
        Some("student-1"),
        Some("Remote work should be mandatory"),
        Some("for"),
        Some(message),
        None,
    )
    .unwrap()
}

#[tokio::test]
async fn remote_work_argument_gets_valid_feedback() {
    let coach = coach_with(
        MockProvider::smart(),
        static_evidence(vec![EvidenceItem::new(
            "Stanford study",
            "A two-year study found a 13% performance increase for home workers.",
            "stanford.edu",
        )]),
    );

    let analysis = coach
        .analyze(&remote_work("Remote work increases productivity."))
        .await
        .unwrap();
    let record = &analysis.outcome.record;

    assert!(!analysis.outcome.is_fallback());
    assert!((MIN_SCORE..=MAX_SCORE).contains(&record.score));
    assert!(!record.strengths.is_empty());
    assert!(!record.overall_feedback.is_empty());
    assert!(record.ideal_answer.contains("According to recent research, A two-year study"));
}

#[tokio::test]
async fn completion_failure_is_surfaced_not_replaced() {
    let coach = coach_with(MockProvider::failing("service unavailable"), static_evidence(vec![]));

    let result = coach.analyze(&remote_work("Remote work increases productivity.")).await;
    assert!(matches!(result, Err(CoachError::ExternalService(_))));

    let result = coach.exchange(&remote_work("Remote work increases productivity.")).await;
    assert!(matches!(result, Err(CoachError::ExternalService(_))));
}

#[tokio::test]
async fn same_key_exchanges_keep_arrival_order() {
    let coach = coach_with(
        MockProvider::smart().with_latency(Duration::from_millis(40)),
        static_evidence(vec![]),
    );

    let first = {
        let coach = coach.clone();
        tokio::spawn(async move { coach.exchange(&remote_work("M1")).await })
    };
    // M1 takes the session lock before M2 arrives
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = {
        let coach = coach.clone();
        tokio::spawn(async move { coach.exchange(&remote_work("M2")).await })
    };

    first.await.unwrap().unwrap();
    let last = second.await.unwrap().unwrap();
    assert_eq!(last.transcript_len, 4);

    let history = coach.sessions().history(&remote_work("x").session_key()).await;
    let shape: Vec<(Sender, u32)> = history.iter().map(|m| (m.sender, m.sequence_number)).collect();
    assert_eq!(
        shape,
        vec![(Sender::User, 1), (Sender::Ai, 2), (Sender::User, 3), (Sender::Ai, 4)]
    );
    assert_eq!(history[0].text, "M1");
    assert_eq!(history[2].text, "M2");
}

#[tokio::test]
async fn distinct_sessions_do_not_cross() {
    let coach = coach_with(
        MockProvider::smart().with_latency(Duration::from_millis(5)),
        static_evidence(vec![]),
    );

    let runs = (0..4).map(|i| {
        let coach = coach.clone();
        async move {
            let user = format!("user-{}", i);
            let message = format!("argument from {}", user);
            let turn = DebateTurn::from_parts(
                Some(user.as_str()),
                Some("Nuclear power"),
                Some("against"),
                Some(message.as_str()),
                None,
            )
            .unwrap();
            coach.exchange(&turn).await.map(|_| turn)
        }
    });

    for turn in futures::future::join_all(runs).await {
        let turn = turn.unwrap();
        let history = coach.sessions().history(&turn.session_key()).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, turn.message);
    }
    assert_eq!(coach.sessions().len().await, 4);
}

#[tokio::test]
async fn unreachable_search_still_yields_feedback() {
    let source = SerpApiSource::new("test-key")
        .with_base_url("http://127.0.0.1:9")
        .with_timeout(Duration::from_secs(2));
    let fetcher = EvidenceFetcher::new(Arc::new(source), Duration::from_secs(2));

    let start = Instant::now();
    assert!(fetcher.fetch("remote work evidence", 3).await.is_empty());
    assert!(start.elapsed() < Duration::from_secs(3));

    let coach = coach_with(MockProvider::smart(), fetcher);
    let analysis = coach
        .analyze(&remote_work("Remote work increases productivity."))
        .await
        .unwrap();
    assert!(!analysis.outcome.is_fallback());
    assert!(!analysis.outcome.record.ideal_answer.contains("According to recent research"));
}
