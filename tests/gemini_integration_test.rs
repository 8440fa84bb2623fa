use base64::{engine::general_purpose::STANDARD, Engine};
use std::time::Duration;
use stock_ai_rust::analyzer::{AnalysisClient, GeminiClient};
use stock_ai_rust::config::{Config, DEFAULT_API_BASE_URL};
use stock_ai_rust::encoder::{rasterize_svg, EncodedPayload, RasterSpec};

const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200"><circle cx="100" cy="100" r="80" fill="orange"/></svg>"#;

fn client() -> Option<GeminiClient> {
    match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            let model = Config::default().model;
            GeminiClient::new(&key, &model, DEFAULT_API_BASE_URL, Duration::from_secs(120)).ok()
        }
        _ => {
            eprintln!("GEMINI_API_KEY not set; skipping integration test");
            None
        }
    }
}

fn payload() -> EncodedPayload {
    let raster = rasterize_svg(SVG.as_bytes(), RasterSpec::ANALYSIS).expect("rasterize");
    EncodedPayload {
        data: STANDARD.encode(&raster.jpeg),
        mime_type: "image/jpeg".into(),
    }
}

#[tokio::test]
async fn gemini_vector_metadata_integration() {
    let Some(client) = client() else { return };

    let metadata = client
        .generate_vector_metadata(&payload())
        .await
        .expect("metadata request failed");

    assert!(!metadata.title.trim().is_empty());
    assert!(!metadata.tags.is_empty());
}

#[tokio::test]
async fn gemini_image_prompt_integration() {
    let Some(client) = client() else { return };

    let prompt = client
        .generate_image_prompt(&payload(), Some("minimal"))
        .await
        .expect("prompt request failed");

    assert!(!prompt.trim().is_empty());
}

#[tokio::test]
async fn gemini_trends_integration() {
    let Some(client) = client() else { return };

    let trends = client
        .get_trending_keywords()
        .await
        .expect("trends request failed");

    for trend in &trends {
        assert!(!trend.category.trim().is_empty());
    }
}
