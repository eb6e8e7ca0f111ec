//! Tests for the TMDB client that need no network.

use marquee_core::MediaKind;
use marquee_interface::MetadataProvider;
use marquee_metadata::{SearchPage, TmdbClient, TmdbConfigBuilder};

#[test]
fn test_search_page_decodes_mixed_hits() {
    let body = r#"{
        "page": 1,
        "results": [
            {
                "id": 603,
                "title": "The Matrix",
                "release_date": "1999-03-30",
                "poster_path": "/m.jpg",
                "popularity": 80.5
            },
            {"id": 1, "name": "", "popularity": 1.0},
            {"id": 70523, "name": "Dark", "first_air_date": "2017-12-01"}
        ]
    }"#;
    let page: SearchPage = serde_json::from_str(body).expect("valid page");
    let candidates: Vec<_> = page
        .results
        .into_iter()
        .filter_map(|hit| hit.into_candidate(MediaKind::Movie, "https://img/w92/"))
        .collect();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].label(), "The Matrix (1999)");
    assert_eq!(candidates[0].poster_url().as_deref(), Some("https://img/w92/m.jpg"));
    assert_eq!(*candidates[1].year(), Some(2017));
}

#[test]
fn test_config_defaults() {
    let config = TmdbConfigBuilder::default()
        .api_key("key")
        .build()
        .expect("valid config");
    assert_eq!(config.base_url(), "https://api.themoviedb.org/3");
    assert_eq!(*config.results_limit(), 8);
}

#[tokio::test]
async fn test_unreachable_provider_degrades_to_empty() {
    let config = TmdbConfigBuilder::default()
        .api_key("key")
        .base_url("http://127.0.0.1:9")
        .timeout_secs(2u64)
        .build()
        .expect("valid config");
    let client = TmdbClient::new(config).expect("client builds");

    assert!(client.search("matrix", None).await.is_empty());
    assert!(client.details(MediaKind::Movie, 603).await.is_none());
}

#[tokio::test]
async fn test_blank_query_skips_network() {
    let config = TmdbConfigBuilder::default()
        .api_key("key")
        .build()
        .expect("valid config");
    let client = TmdbClient::new(config).expect("client builds");
    assert!(client.search("   ", None).await.is_empty());
}
