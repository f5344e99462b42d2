//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small classifieds site and run the
//! full crawl cycle end-to-end: pagination, listing dispatch, extraction,
//! export.

use rental_crawler::config::{
    load_config, Config, CrawlerConfig, NotifyConfig, OutputConfig, UserAgentConfig,
};
use rental_crawler::crawler::Coordinator;
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/search/aap?s=100";

/// Creates a test configuration with a single region rooted at `base_url`
fn create_test_config(base_url: &str, properties_path: &Path, testing_mode: bool) -> Config {
    let mut start_urls = BTreeMap::new();
    start_urls.insert("testville".to_string(), base_url.to_string());

    Config {
        crawler: CrawlerConfig {
            testing_mode,
            request_delay_seconds: 0.0,
            auto_throttle: false,
            allowed_domains: vec!["127.0.0.1".to_string()],
            search_path: SEARCH_PATH.to_string(),
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            properties_path: properties_path.display().to_string(),
        },
        notify: None,
        start_urls,
    }
}

fn index_page(listing_hrefs: &[&str], next_href: Option<&str>) -> String {
    let listings: String = listing_hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<li class="result-row"><a href="{}" class="result-title hdrlnk">Listing</a></li>"#,
                href
            )
        })
        .collect();
    let next = next_href
        .map(|href| format!(r#"<a href="{}" class="button next">next &gt;</a>"#, href))
        .unwrap_or_default();

    format!(
        r#"<html><body><ul class="rows">{}</ul><span class="buttons">{}</span></body></html>"#,
        listings, next
    )
}

fn listing_page(id: &str) -> String {
    format!(
        r#"<html><body>
            <span class="price">$500</span>
            <p class="attrgroup"><span>2BR</span><span>1Ba</span></p>
            <p class="postinginfo">post id: {}</p>
        </body></html>"#,
        id
    )
}

async fn mount_listing(server: &MockServer, listing_path: &str, id: &str) {
    Mock::given(method("GET"))
        .and(path(listing_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(id)))
        .mount(server)
        .await;
}

fn relay_config(server: &MockServer, api_key_env: &str) -> NotifyConfig {
    NotifyConfig {
        email: "me@example.com".to_string(),
        sender: "crawler@example.com".to_string(),
        api_url: format!("{}/v3/smtp/email", server.uri()),
        api_key_env: api_key_env.to_string(),
    }
}

async fn mount_relay(server: &MockServer, api_key: &str) {
    Mock::given(method("POST"))
        .and(path("/v3/smtp/email"))
        .and(header("api-key", api_key))
        .and(body_partial_json(serde_json::json!({
            "subject": "Your Scraping Results",
            "to": [{"email": "me@example.com"}]
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(server)
        .await;
}

fn read_export(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .expect("Failed to read properties file")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Export line is not JSON"))
        .collect()
}

#[tokio::test]
async fn test_two_listing_crawl() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let properties = temp_dir.path().join("properties.txt");

    Mock::given(method("GET"))
        .and(path("/search/aap"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(index_page(&["/listing/1", "/listing/2"], None)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_listing(&mock_server, "/listing/1", "1001").await;
    mount_listing(&mock_server, "/listing/2", "1002").await;

    let config = create_test_config(&mock_server.uri(), &properties, false);
    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    let store = coordinator.store();
    assert_eq!(store.len(), 2);
    for id in ["1001", "1002"] {
        let record = store.get(id).unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.bedrooms, "2");
        assert_eq!(record.bathrooms, "1");
        assert_eq!(record.rent_per_week, "500");
    }

    assert_eq!(report.regions, 1);
    assert_eq!(report.index_pages, 1);
    assert_eq!(report.listings_requested, 2);
    assert_eq!(report.listings_stored, 2);
    assert_eq!(report.unique_listings, 2);
    assert!(report.finished_at.is_some());

    let runs = read_export(&properties);
    assert_eq!(runs.len(), 1);
    let object = runs[0].as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(object["1001"]["bedrooms"], "2");
    assert_eq!(object["1002"]["rentPerWeek"], "500");
    assert_eq!(object["1002"]["smokingAllowed"], true);
    assert_eq!(object["1002"]["location"]["lat"], "N.A");
}

#[tokio::test]
async fn test_crawl_follows_pagination() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let properties = temp_dir.path().join("properties.txt");

    Mock::given(method("GET"))
        .and(path("/search/aap"))
        .and(query_param("s", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(
            &["/listing/1", "/listing/2"],
            Some("/search/aap?s=200"),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/aap"))
        .and(query_param("s", "200"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(index_page(&["/listing/3", "/listing/1"], None)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_listing(&mock_server, "/listing/1", "1001").await;
    mount_listing(&mock_server, "/listing/2", "1002").await;
    mount_listing(&mock_server, "/listing/3", "1003").await;

    let config = create_test_config(&mock_server.uri(), &properties, false);
    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    // /listing/1 is fetched twice and stored once
    assert_eq!(report.index_pages, 2);
    assert_eq!(report.listings_requested, 4);
    assert_eq!(report.unique_listings, 3);
    assert_eq!(coordinator.store().len(), 3);
}

#[tokio::test]
async fn test_failing_listing_does_not_abort_crawl() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let properties = temp_dir.path().join("properties.txt");

    Mock::given(method("GET"))
        .and(path("/search/aap"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(index_page(&["/listing/1", "/listing/broken"], None)),
        )
        .mount(&mock_server)
        .await;
    mount_listing(&mock_server, "/listing/1", "1001").await;
    Mock::given(method("GET"))
        .and(path("/listing/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &properties, false);
    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.listings_stored, 1);
    assert_eq!(report.fetch_failures, 1);
    assert!(coordinator.store().get("1001").is_some());
    assert_eq!(read_export(&properties)[0].as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unreachable_start_page_still_exports() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let properties = temp_dir.path().join("properties.txt");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &properties, false);
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.index_pages, 0);
    assert_eq!(report.fetch_failures, 1);
    assert_eq!(std::fs::read_to_string(&properties).unwrap(), "{}\n");
}

#[tokio::test]
async fn test_testing_mode_crawls_one_listing() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let properties = temp_dir.path().join("properties.txt");

    Mock::given(method("GET"))
        .and(path("/search/aap"))
        .and(query_param("s", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(
            &["/listing/1", "/listing/2"],
            Some("/search/aap?s=200"),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/aap"))
        .and(query_param("s", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(&[], None)))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_listing(&mock_server, "/listing/1", "1001").await;
    Mock::given(method("GET"))
        .and(path("/listing/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page("1002")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &properties, true);
    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.index_pages, 1);
    assert_eq!(report.listings_requested, 1);
    assert_eq!(coordinator.store().len(), 1);
}

#[tokio::test]
async fn test_offsite_listing_links_dropped() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let properties = temp_dir.path().join("properties.txt");

    Mock::given(method("GET"))
        .and(path("/search/aap"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(
            &["/listing/1", "https://elsewhere.example.com/listing/9"],
            None,
        )))
        .mount(&mock_server)
        .await;
    mount_listing(&mock_server, "/listing/1", "1001").await;

    let config = create_test_config(&mock_server.uri(), &properties, false);
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.listings_stored, 1);
    assert_eq!(report.offsite_dropped, 1);
}

#[tokio::test]
async fn test_runs_append_to_properties_file() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let properties = temp_dir.path().join("properties.txt");

    Mock::given(method("GET"))
        .and(path("/search/aap"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(index_page(&["/listing/1"], None)),
        )
        .mount(&mock_server)
        .await;
    mount_listing(&mock_server, "/listing/1", "1001").await;

    for _ in 0..2 {
        let config = create_test_config(&mock_server.uri(), &properties, false);
        Coordinator::new(config).unwrap().run().await.unwrap();
    }

    let runs = read_export(&properties);
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0], runs[1]);
}

#[tokio::test]
async fn test_crawl_from_config_file() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let properties = temp_dir.path().join("properties.txt");
    let config_path = temp_dir.path().join("config.toml");

    Mock::given(method("GET"))
        .and(path("/search/aap"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(index_page(&["/listing/7"], None)),
        )
        .mount(&mock_server)
        .await;
    mount_listing(&mock_server, "/listing/7", "7007").await;

    let toml = format!(
        r#"
[crawler]
request-delay-seconds = 0.0

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
properties-path = "{}"

[start-urls]
testville = "{}"
"#,
        properties.display(),
        mock_server.uri()
    );
    std::fs::write(&config_path, toml).unwrap();

    let config = load_config(&config_path).unwrap();
    let report = rental_crawler::crawler::crawl(config).await.unwrap();

    assert_eq!(report.unique_listings, 1);
    assert!(read_export(&properties)[0].get("7007").is_some());
}

#[tokio::test]
async fn test_completion_notice_sent_after_crawl() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let properties = temp_dir.path().join("properties.txt");

    Mock::given(method("GET"))
        .and(path("/search/aap"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(index_page(&["/listing/1"], None)),
        )
        .mount(&mock_server)
        .await;
    mount_listing(&mock_server, "/listing/1", "1001").await;
    mount_relay(&mock_server, "relay-secret").await;

    std::env::set_var("RENTAL_CRAWLER_NOTIFY_KEY_OK", "relay-secret");
    let mut config = create_test_config(&mock_server.uri(), &properties, false);
    config.notify = Some(relay_config(&mock_server, "RENTAL_CRAWLER_NOTIFY_KEY_OK"));

    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.unique_listings, 1);
    assert_eq!(read_export(&properties).len(), 1);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_failed_export_still_completes_and_notifies() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let properties = temp_dir.path().join("missing-dir").join("properties.txt");

    Mock::given(method("GET"))
        .and(path("/search/aap"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(index_page(&["/listing/1", "/listing/2"], None)),
        )
        .mount(&mock_server)
        .await;
    mount_listing(&mock_server, "/listing/1", "1001").await;
    mount_listing(&mock_server, "/listing/2", "1002").await;
    mount_relay(&mock_server, "relay-secret-2").await;

    std::env::set_var("RENTAL_CRAWLER_NOTIFY_KEY_EXPORT", "relay-secret-2");
    let mut config = create_test_config(&mock_server.uri(), &properties, false);
    config.notify = Some(relay_config(&mock_server, "RENTAL_CRAWLER_NOTIFY_KEY_EXPORT"));

    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.listings_stored, 2);
    assert_eq!(coordinator.store().len(), 2);
    assert!(coordinator.store().get("1002").is_some());
    assert!(!properties.exists());
    mock_server.verify().await;
}

#[tokio::test]
async fn test_missing_api_key_skips_notice() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let properties = temp_dir.path().join("properties.txt");

    Mock::given(method("GET"))
        .and(path("/search/aap"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(&[], None)))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), &properties, false);
    config.notify = Some(relay_config(&mock_server, "RENTAL_CRAWLER_NOTIFY_KEY_UNSET"));

    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.unique_listings, 0);
    mock_server.verify().await;
}
