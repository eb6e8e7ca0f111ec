//! Tests for provider record normalization.

use marquee_core::{ContentRecord, MediaKind, MetadataNormalizer, PosterSource};
use serde_json::json;

fn movie_payload() -> serde_json::Value {
    json!({
        "id": 603,
        "title": "The Matrix",
        "release_date": "1999-03-30",
        "vote_average": 8.2,
        "overview": "A hacker learns the truth about reality.",
        "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
        "poster_path": "/matrix.jpg",
        "backdrop_path": "/matrix-bg.jpg",
        "credits": {
            "cast": [
                {"name": "Keanu Reeves"},
                {"name": "Laurence Fishburne"},
                {"name": "Carrie-Anne Moss"},
                {"name": "Hugo Weaving"},
                {"name": "Joe Pantoliano"},
                {"name": "Marcus Chong"}
            ],
            "crew": [
                {"name": "Bill Pope", "job": "Director of Photography"},
                {"name": "Lana Wachowski", "job": "Director"},
                {"name": "Lilly Wachowski", "job": "Director"}
            ]
        },
        "similar": {
            "results": [
                {"title": "Dark City"},
                {"title": "eXistenZ"},
                {"title": "Equilibrium"},
                {"title": "The Thirteenth Floor"},
                {"title": "Inception"}
            ]
        }
    })
}

#[test]
fn test_movie_fields_unified() {
    let record = MetadataNormalizer::default().normalize(&movie_payload(), MediaKind::Movie);

    assert_eq!(record.title, "The Matrix");
    assert_eq!(record.year, Some(1999));
    assert_eq!(record.rating, Some(8.2));
    assert_eq!(record.genres, vec!["Action", "Science Fiction"]);
    assert_eq!(record.director.as_deref(), Some("Lana Wachowski"));
    assert_eq!(record.cast.len(), ContentRecord::MAX_CAST);
    assert_eq!(record.cast[0], "Keanu Reeves");
    assert_eq!(record.similar.len(), ContentRecord::MAX_SIMILAR);
    assert_eq!(record.similar[3], "The Thirteenth Floor");
    assert_eq!(
        record.poster,
        PosterSource::Remote("https://image.tmdb.org/t/p/w500/matrix.jpg".to_string())
    );
    assert_eq!(
        record.backdrop_url.as_deref(),
        Some("https://image.tmdb.org/t/p/w1280/matrix-bg.jpg")
    );
    assert!(record.language.is_none());
}

#[test]
fn test_show_uses_name_and_air_date() {
    let raw = json!({
        "name": "Dark",
        "first_air_date": "2017-12-01",
        "created_by": [{"name": "Baran bo Odar"}],
        "overview": "x".repeat(2000),
    });
    let record = MetadataNormalizer::default().normalize(&raw, MediaKind::Show);

    assert_eq!(record.title, "Dark");
    assert_eq!(record.year, Some(2017));
    assert_eq!(record.director.as_deref(), Some("Baran bo Odar"));
    // Truncation belongs to the renderers.
    assert_eq!(record.overview.len(), 2000);
}

#[test]
fn test_garbage_record_falls_back() {
    let raw = json!({"title": 42, "release_date": "soon", "genres": "nope", "credits": []});
    let record = MetadataNormalizer::default().normalize(&raw, MediaKind::Movie);

    assert_eq!(record.title, "N/A");
    assert_eq!(record.year, None);
    assert_eq!(record.year_label(), "----");
    assert_eq!(record.rating_label(), "N/A");
    assert!(record.genres.is_empty());
    assert!(record.cast.is_empty());
    assert!(record.director.is_none());
    assert_eq!(record.poster, PosterSource::None);
}

#[test]
fn test_non_object_record_falls_back() {
    let record = MetadataNormalizer::default().normalize(&json!(null), MediaKind::Movie);
    assert_eq!(record.title, "N/A");
}

#[test]
fn test_custom_image_bases() {
    let normalizer = MetadataNormalizer::new("https://img.example/p/", "https://img.example/b");
    let record = normalizer.normalize(&movie_payload(), MediaKind::Movie);
    assert_eq!(
        record.poster,
        PosterSource::Remote("https://img.example/p/matrix.jpg".to_string())
    );
}
