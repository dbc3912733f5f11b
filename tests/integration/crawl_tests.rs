//! Integration tests for the crawl engine
//!
//! These tests use wiremock to stand in for rental vendors and run whole
//! vendor crawls and jobs end-to-end. Vendor roots point at the mock
//! servers, so rules are keyed by `127.0.0.1:<port>`.

use rent_scout::config::{parse_config, Config};
use rent_scout::crawler::scout;
use rent_scout::output::flatten_report;
use rent_scout::storage::{JobRunner, JobStatus, SqliteJobStore};
use rent_scout::{CarQuery, Engine, ScoutError};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a configuration with one vendor per server
///
/// `engine` is spliced into the `[engine]` table so tests can tune depth,
/// concurrency, budgets and speculative lookup.
fn create_test_config(servers: &[&MockServer], engine: &str) -> Config {
    let mut toml = format!(
        r#"
[engine]
{engine}

[fetch]
max-retries = 1
base-timeout-secs = 10
retry-delay-ms = 1

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
"#
    );

    for server in servers {
        toml.push_str(&format!(
            r#"
[[vendor]]
root = "{}"
path-prefixes = ["/cars/"]
excluded-path-prefixes = ["/ru/"]
price-selector = "span.price"
price-cleaner = "first-token-strip-commas"
"#,
            server.uri()
        ));
    }

    parse_config(&toml).expect("test config should be valid")
}

fn engine_for(servers: &[&MockServer], engine: &str) -> Engine {
    Engine::from_config(&create_test_config(servers, engine)).expect("engine should build")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(hits)
        .mount(server)
        .await;
}

fn bmw_x5() -> Vec<CarQuery> {
    vec![CarQuery::new("BMW", "X5").unwrap()]
}

fn prices(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|p| p.to_string()).collect()
}

#[tokio::test]
async fn test_unsupported_domain_makes_no_requests() {
    let known = MockServer::start().await;
    let unknown = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("never"))
        .expect(0)
        .mount(&unknown)
        .await;

    let engine = engine_for(&[&known], "speculative-lookup = false");
    let result = engine.crawl_domain(&unknown.uri(), &bmw_x5()).await.unwrap();

    assert!(result.is_empty());
}

#[tokio::test]
async fn test_end_to_end_price_extraction() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/cars/">All cars</a><a href="/cars/bmw-x5/">BMW X5</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/cars/", r#"<a href="/cars/audi-q7/">Q7</a>"#, 1).await;
    mount_page(
        &server,
        "/cars/bmw-x5/",
        r#"<span class="price">3,400 AED</span>"#,
        1,
    )
    .await;
    mount_page(&server, "/cars/audi-q7/", r#"<span class="price">2,100 AED</span>"#, 1).await;

    let engine = engine_for(&[&server], "speculative-lookup = false");
    let result = engine.crawl_domain(&server.uri(), &bmw_x5()).await.unwrap();

    let findings = &result[&server.uri()];
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].make, "BMW");
    assert_eq!(findings[0].model, "X5");
    assert_eq!(findings[0].url, format!("{}/cars/bmw-x5/", server.uri()));
    assert_eq!(findings[0].prices, prices(&["3400"]));
}

#[tokio::test]
async fn test_depth_limit_stops_traversal() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/about/">About</a>"#, 1).await;
    // Only reachable from depth 1, which a max depth of 1 never fetches
    mount_page(&server, "/about/", r#"<a href="/cars/bmw-x5/">X5</a>"#, 0).await;
    mount_page(&server, "/cars/bmw-x5/", r#"<span class="price">3,400 AED</span>"#, 0).await;

    let engine = engine_for(&[&server], "max-depth = 1\nspeculative-lookup = false");
    let result = engine.crawl_domain(&server.uri(), &bmw_x5()).await.unwrap();

    assert!(result.is_empty());
}

#[tokio::test]
async fn test_deeper_crawl_reaches_detail_page() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/about/">About</a>"#, 1).await;
    mount_page(&server, "/about/", r#"<a href="/cars/bmw-x5/">X5</a>"#, 1).await;
    mount_page(&server, "/cars/bmw-x5/", r#"<span class="price">3,400 AED</span>"#, 1).await;

    let engine = engine_for(&[&server], "max-depth = 2\nspeculative-lookup = false");
    let result = engine.crawl_domain(&server.uri(), &bmw_x5()).await.unwrap();

    assert_eq!(result[&server.uri()][0].prices, prices(&["3400"]));
}

#[tokio::test]
async fn test_excluded_prefixes_are_never_fetched() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/ru/">RU</a><a href="/ru/cars/bmw-x5/">X5 (ru)</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/ru/", "", 0).await;
    mount_page(&server, "/ru/cars/bmw-x5/", r#"<span class="price">1</span>"#, 0).await;

    let engine = engine_for(&[&server], "speculative-lookup = false");
    let result = engine.crawl_domain(&server.uri(), &bmw_x5()).await.unwrap();

    assert!(result.is_empty());
}

#[tokio::test]
async fn test_detail_page_found_twice_is_fetched_once() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/cars/bmw-x5/">X5</a>
           <a href="/cars/bmw-x5/#gallery">X5 photos</a>
           <a href="/offers/">Offers</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/offers/", r#"<a href="/cars/bmw-x5/">X5 deal</a>"#, 1).await;
    mount_page(&server, "/cars/bmw-x5/", r#"<span class="price">3,400 AED</span>"#, 1).await;

    let engine = engine_for(&[&server], "speculative-lookup = false");
    let result = engine.crawl_domain(&server.uri(), &bmw_x5()).await.unwrap();

    assert_eq!(result[&server.uri()].len(), 1);
}

#[tokio::test]
async fn test_page_budget_caps_traversal() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/a/">A</a><a href="/b/">B</a>"#, 1).await;
    mount_page(&server, "/a/", "", 0).await;
    mount_page(&server, "/b/", "", 0).await;

    let engine = engine_for(
        &[&server],
        "max-pages-per-domain = 1\nspeculative-lookup = false",
    );
    let result = engine.crawl_domain(&server.uri(), &bmw_x5()).await.unwrap();

    assert!(result.is_empty());
}

#[tokio::test]
async fn test_failing_page_does_not_abort_crawl() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/cars/bmw-x5/">X5</a><a href="/cars/audi-q7/">Q7</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/cars/bmw-x5/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/cars/audi-q7/", r#"<span class="price">2,100 AED</span>"#, 1).await;

    let queries = vec![
        CarQuery::new("BMW", "X5").unwrap(),
        CarQuery::new("Audi", "Q7").unwrap(),
    ];
    let engine = engine_for(&[&server], "speculative-lookup = false");
    let result = engine.crawl_domain(&server.uri(), &queries).await.unwrap();

    let findings = &result[&server.uri()];
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].model, "Q7");
    assert_eq!(findings[0].prices, prices(&["2100"]));
}

#[tokio::test]
async fn test_matched_page_without_price_reports_na() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/cars/bmw-x5/">X5</a>"#, 1).await;
    mount_page(&server, "/cars/bmw-x5/", "Call us for a quote", 1).await;

    let engine = engine_for(&[&server], "speculative-lookup = false");
    let result = engine.crawl_domain(&server.uri(), &bmw_x5()).await.unwrap();

    assert_eq!(result[&server.uri()][0].prices, prices(&["N/A"]));
}

#[tokio::test]
async fn test_speculative_hit_skips_traversal() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/cars/bmw-x5/">X5</a>"#, 0).await;
    mount_page(&server, "/cars/bmw-x5/", r#"<span class="price">3,400 AED</span>"#, 1).await;
    // The model-only candidate is probed too and misses
    Mock::given(method("GET"))
        .and(path("/cars/x5/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&[&server], "speculative-lookup = true");
    let result = engine.crawl_domain(&server.uri(), &bmw_x5()).await.unwrap();

    assert_eq!(result[&server.uri()][0].prices, prices(&["3400"]));
}

#[tokio::test]
async fn test_speculative_miss_falls_back_to_traversal() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/cars/bmw-x5-2024/">X5</a>"#, 1).await;
    mount_page(
        &server,
        "/cars/bmw-x5-2024/",
        r#"<span class="price">3,900 AED</span>"#,
        1,
    )
    .await;
    // /cars/bmw-x5/ and /cars/x5/ fall through to wiremock's 404

    let engine = engine_for(&[&server], "speculative-lookup = true");
    let result = engine.crawl_domain(&server.uri(), &bmw_x5()).await.unwrap();

    let findings = &result[&server.uri()];
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].url, format!("{}/cars/bmw-x5-2024/", server.uri()));
}

#[tokio::test]
async fn test_speculative_page_without_price_falls_back() {
    let server = MockServer::start().await;

    mount_page(&server, "/cars/bmw-x5/", "Sold out", 2).await;
    mount_page(&server, "/", r#"<a href="/cars/bmw-x5/">X5</a>"#, 1).await;

    let engine = engine_for(&[&server], "speculative-lookup = true");
    let result = engine.crawl_domain(&server.uri(), &bmw_x5()).await.unwrap();

    assert_eq!(result[&server.uri()][0].prices, prices(&["N/A"]));
}

#[tokio::test]
async fn test_repeated_crawls_agree() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/cars/bmw-x5/">X5</a><a href="/cars/bmw-x5-m/">X5 M</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cars/bmw-x5/"))
        .respond_with(html(r#"<span class="price">3,400 AED</span>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cars/bmw-x5-m/"))
        .respond_with(html(r#"<span class="price">4,800 AED</span>"#))
        .mount(&server)
        .await;

    let engine = engine_for(&[&server], "speculative-lookup = false");
    let first = engine.crawl_domain(&server.uri(), &bmw_x5()).await.unwrap();
    let second = engine.crawl_domain(&server.uri(), &bmw_x5()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first[&server.uri()].len(), 2);
}

#[tokio::test]
async fn test_run_job_merges_vendors_and_skips_bad_roots() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    for server in [&first, &second] {
        mount_page(server, "/", r#"<a href="/cars/bmw-x5/">X5</a>"#, 1).await;
    }
    mount_page(&first, "/cars/bmw-x5/", r#"<span class="price">3,400 AED</span>"#, 1).await;
    mount_page(&second, "/cars/bmw-x5/", r#"<span class="price">3,650 AED</span>"#, 1).await;

    let engine = engine_for(&[&first, &second], "speculative-lookup = false");
    let domains = vec![first.uri(), "not a url".to_string(), second.uri()];
    let result = engine.run_job(&bmw_x5(), &domains).await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result[&first.uri()][0].prices, prices(&["3400"]));
    assert_eq!(result[&second.uri()][0].prices, prices(&["3650"]));

    let rows = flatten_report(&result);
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_deadline_abandons_job() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("slow").set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let engine = engine_for(&[&server], "speculative-lookup = false");
    let result = engine
        .run_job_with_deadline(&bmw_x5(), &[server.uri()], Duration::from_millis(200))
        .await;

    match result {
        Err(e @ ScoutError::DeadlineExceeded { .. }) => {
            assert_eq!(e.to_string(), "Job exceeded its deadline of 200ms");
        }
        other => panic!("expected a deadline error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_job_runner_records_result_in_sqlite() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/cars/bmw-x5/">X5</a>"#, 1).await;
    mount_page(&server, "/cars/bmw-x5/", r#"<span class="price">3,400 AED</span>"#, 1).await;

    let temp_dir = TempDir::new().unwrap();
    let store = SqliteJobStore::new(&temp_dir.path().join("jobs.db")).unwrap();
    let runner = JobRunner::new(
        engine_for(&[&server], "speculative-lookup = false"),
        Arc::new(Mutex::new(store)),
    );

    let id = runner.run(&bmw_x5(), &[server.uri()]).await.unwrap();

    match runner.status(&id).unwrap() {
        Some(JobStatus::Done(result)) => {
            assert_eq!(result[&server.uri()][0].prices, prices(&["3400"]));
        }
        other => panic!("unexpected status: {:?}", other),
    }
}

#[tokio::test]
async fn test_job_runner_records_deadline_as_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("slow").set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let runner = JobRunner::new(
        engine_for(&[&server], "speculative-lookup = false"),
        rent_scout::storage::memory_job_store(),
    )
    .with_deadline(Some(Duration::from_millis(200)));

    let id = runner.run(&bmw_x5(), &[server.uri()]).await.unwrap();

    match runner.status(&id).unwrap() {
        Some(JobStatus::Error(message)) => assert!(message.ends_with("200ms"), "{}", message),
        other => panic!("unexpected status: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetches_stay_within_concurrency_limit() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(300);
    let pages = 6;

    let links: String = (1..=pages)
        .map(|i| format!(r#"<a href="/cars/bmw-x5-{}/">X5</a>"#, i))
        .collect();
    mount_page(&server, "/", &links, 1).await;

    for i in 1..=pages {
        Mock::given(method("GET"))
            .and(path(format!("/cars/bmw-x5-{}/", i)))
            .respond_with(html(r#"<span class="price">3,400 AED</span>"#).set_delay(delay))
            .expect(1)
            .mount(&server)
            .await;
    }

    let engine = engine_for(
        &[&server],
        "max-concurrency = 2\nspeculative-lookup = false",
    );
    let started = Instant::now();
    let result = engine.crawl_domain(&server.uri(), &bmw_x5()).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(result[&server.uri()].len(), pages);
    // Six pages two at a time take at least three rounds of the delay
    assert!(elapsed >= delay * 3, "finished too fast: {:?}", elapsed);
}

#[tokio::test]
async fn test_scout_crawls_enabled_vendors_by_default() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/cars/bmw-x5/">X5</a>"#, 1).await;
    mount_page(&server, "/cars/bmw-x5/", r#"<span class="price">3,400 AED</span>"#, 1).await;

    let config = create_test_config(&[&server], "speculative-lookup = false");
    let result = scout(&config, &bmw_x5(), None).await.unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[&server.uri()][0].prices, prices(&["3400"]));
}
