// tests/fallback_order.rs
mod common;

use common::{no_delay, rss_with, ScriptedFetcher};
use listing_watch::error::FetchError;
use listing_watch::ingest::fallback::{
    fetch_first_available, try_source, RetryPolicy, SourceOutcome,
};
use listing_watch::{ExtractorKind, SourceDescriptor};
use std::time::Duration;

fn chain() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor::new("s1", "https://s1.test", ExtractorKind::Rss),
        SourceDescriptor::new("s2", "https://s2.test", ExtractorKind::Rss),
        SourceDescriptor::new("s3", "https://s3.test", ExtractorKind::Rss),
    ]
}

#[tokio::test]
async fn timeouts_then_empty_then_hit() {
    let s3_body = rss_with(&[
        "Binance Will List AAA (AAA)",
        "New Trading Pair: AAA/USDT",
        "Binance Will List BBB (BBB)",
    ]);
    let fetcher = ScriptedFetcher::new()
        .on("https://s1.test", vec![Err(FetchError::Timeout)])
        .on(
            "https://s2.test",
            vec![Ok(rss_with(&["Wallet maintenance", "Spot Trading update"]))],
        )
        .on("https://s3.test", vec![Ok(s3_body.clone())]);

    let out = fetch_first_available(&fetcher, &chain(), &no_delay()).await;

    assert_eq!(out.source.as_deref(), Some("s3"));
    let expected = listing_watch::ingest::extract(&chain()[2], &s3_body).unwrap();
    assert_eq!(out.items, expected);
    assert_eq!(out.items.len(), 2);

    // s1: full retry budget; s2: a single fetch (empty is not retried); s3: one fetch
    assert_eq!(fetcher.calls("https://s1.test"), 2);
    assert_eq!(fetcher.calls("https://s2.test"), 1);
    assert_eq!(fetcher.calls("https://s3.test"), 1);
}

#[tokio::test]
async fn first_source_wins_and_later_ones_are_untouched() {
    let fetcher = ScriptedFetcher::new()
        .on("https://s1.test", vec![Ok(rss_with(&["Binance Will List ONE (ONE)"]))])
        .on("https://s2.test", vec![Ok(rss_with(&["Binance Will List TWO (TWO)"]))]);

    let out = fetch_first_available(&fetcher, &chain(), &no_delay()).await;
    assert_eq!(out.source.as_deref(), Some("s1"));
    assert_eq!(fetcher.calls("https://s2.test"), 0);
    assert_eq!(fetcher.calls("https://s3.test"), 0);
}

#[tokio::test]
async fn transient_failure_recovers_within_budget() {
    let fetcher = ScriptedFetcher::new().on(
        "https://s1.test",
        vec![
            Err(FetchError::Status(503)),
            Ok(rss_with(&["Binance Will List ONE (ONE)"])),
        ],
    );
    let outcome = try_source(&fetcher, &chain()[0], &no_delay()).await;
    assert!(matches!(outcome, SourceOutcome::Hit(ref v) if v.len() == 1));
    assert_eq!(fetcher.calls("https://s1.test"), 2);
}

#[tokio::test]
async fn unparseable_document_is_a_miss_not_a_retry() {
    let fetcher = ScriptedFetcher::new().on("https://s1.test", vec![Ok("<<<".to_string())]);
    let outcome = try_source(&fetcher, &chain()[0], &no_delay()).await;
    assert_eq!(outcome, SourceOutcome::Miss);
    assert_eq!(fetcher.calls("https://s1.test"), 1);
}

#[tokio::test]
async fn everything_exhausted_yields_empty() {
    let fetcher = ScriptedFetcher::new()
        .on("https://s1.test", vec![Err(FetchError::Connect("refused".into()))])
        .on("https://s2.test", vec![Err(FetchError::Status(500))])
        .on("https://s3.test", vec![Ok(rss_with(&[]))]);

    let out = fetch_first_available(&fetcher, &chain(), &no_delay()).await;
    assert!(out.source.is_none());
    assert!(out.items.is_empty());

    let outcome = try_source(&fetcher, &chain()[1], &no_delay()).await;
    assert_eq!(
        outcome,
        SourceOutcome::Exhausted {
            attempts: 2,
            last_error: FetchError::Status(500)
        }
    );
}

#[tokio::test(start_paused = true)]
async fn retries_are_spaced_by_the_policy() {
    let fetcher = ScriptedFetcher::new().on("https://s1.test", vec![Err(FetchError::Timeout)]);
    let src = &chain()[0];

    let t0 = tokio::time::Instant::now();
    let out = try_source(&fetcher, src, &RetryPolicy::default()).await;
    assert!(matches!(out, SourceOutcome::Exhausted { attempts: 2, .. }));
    let elapsed = t0.elapsed();
    // one 2s pause between the two attempts, none after the last
    assert!(elapsed >= Duration::from_secs(2), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "{elapsed:?}");

    let three = RetryPolicy {
        attempts: 3,
        ..RetryPolicy::default()
    };
    let t1 = tokio::time::Instant::now();
    try_source(&fetcher, src, &three).await;
    let elapsed = t1.elapsed();
    assert!(elapsed >= Duration::from_secs(5), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(6), "{elapsed:?}");
}
