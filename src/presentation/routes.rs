// Router construction for the API services and the dashboard
use crate::presentation::app_state::{ApiState, DashboardState, ServiceVariant};
use crate::presentation::dashboard_handlers::{dashboard_page, update_dashboard};
use crate::presentation::handlers::{convert_image, health_check, index, tokenize};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

/// `/`, `/healthz` and `/convert`, plus `/tokenize` when text analysis is enabled
pub fn api_router(state: ApiState) -> Router {
    let variant = state.variant();
    let mut router = Router::new()
        .route("/", get(index))
        .route("/healthz", get(health_check))
        .route("/convert", post(convert_image));

    if variant == ServiceVariant::TextAnalysis {
        router = router.route("/tokenize", post(tokenize));
    }

    router
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub fn dashboard_router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/healthz", get(health_check))
        .route("/api/update", get(update_dashboard))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::conversion_service::ImageConversionService;
    use crate::application::dashboard_service::CallDashboardService;
    use crate::application::tagger::{parse_tagged_corpus, PerceptronTagger, TrainingOptions};
    use crate::application::text_analysis_service::TextAnalysisService;
    use crate::application::tokenizer::WordTokenizer;
    use crate::domain::calls::CallTable;
    use crate::domain::image_format::OutputFormat;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const BOUNDARY: &str = "utility-test-boundary";

    fn language_state() -> ApiState {
        let corpus = parse_tagged_corpus(
            "The/DT cat/NN sat/VBD ./.\nThe/DT cat/NN sat/VBD still/RB ./.\nA/DT bird/NN sang/VBD ./.",
        )
        .unwrap();
        let tagger = PerceptronTagger::train(&corpus, TrainingOptions::default()).unwrap();
        ApiState::with_text_analysis(TextAnalysisService::new(WordTokenizer::new(false), Arc::new(tagger)))
    }

    fn sample_image() -> Vec<u8> {
        let service = ImageConversionService::new();
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 10]));
        let mut png = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();
        service.convert(png.get_ref(), OutputFormat::Bmp).unwrap().bytes.to_vec()
    }

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a [u8]),
    }

    fn multipart(parts: &[Part]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", name, value).as_bytes(),
                    );
                }
                Part::File(name, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"upload.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                            name
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/convert")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap()
    }

    fn urlencoded(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    async fn json_body(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_index_lists_variant_routes() {
        let response = api_router(ApiState::conversion_only()).oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["usage"]["convert"].is_object());
        assert!(body["usage"]["tokenize"].is_null());

        let response = api_router(language_state()).oneshot(get_request("/")).await.unwrap();
        let body = json_body(response).await;
        assert_eq!(body["usage"]["tokenize"]["endpoint"], "/tokenize");
    }

    #[tokio::test]
    async fn test_convert_success_for_every_format() {
        let image = sample_image();
        for (requested, format) in [("jpeg", "image/jpeg"), ("PNG", "image/png"), ("bmp", "image/bmp"), ("Gif", "image/gif")] {
            let request = multipart(&[Part::File("image", &image), Part::Text("output_format", requested)]);
            let response = api_router(ApiState::conversion_only()).oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[header::CONTENT_TYPE], format);
            let bytes = body_bytes(response).await;
            let expected: OutputFormat = requested.parse().unwrap();
            assert_eq!(image::guess_format(&bytes).unwrap(), expected.image_format());
        }
    }

    #[tokio::test]
    async fn test_convert_missing_fields() {
        let image = sample_image();
        let requests = vec![
            multipart(&[Part::File("image", &image)]),
            multipart(&[Part::Text("output_format", "png")]),
            multipart(&[]),
            urlencoded("/convert", "output_format=png"),
            Request::builder().method("POST").uri("/convert").body(Body::empty()).unwrap(),
        ];

        for request in requests {
            let response = api_router(ApiState::conversion_only()).oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                json_body(response).await,
                json!({"error": "Image file and output format are required."})
            );
        }
    }

    #[tokio::test]
    async fn test_convert_unsupported_format_regardless_of_image() {
        let image = sample_image();
        for data in [image.as_slice(), b"garbage".as_slice()] {
            let request = multipart(&[Part::File("image", data), Part::Text("output_format", "TIFF")]);
            let response = api_router(ApiState::conversion_only()).oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(json_body(response).await, json!({"error": "Unsupported output format."}));
        }
    }

    #[tokio::test]
    async fn test_convert_undecodable_image_is_server_error() {
        let request = multipart(&[Part::File("image", b"not an image"), Part::Text("output_format", "png")]);
        let response = api_router(ApiState::conversion_only()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tokenize_is_only_on_text_variant() {
        let response = api_router(ApiState::conversion_only())
            .oneshot(urlencoded("/tokenize", "sentence=The+cat+sat."))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tokenize_sentence() {
        let response = api_router(language_state())
            .oneshot(urlencoded("/tokenize", "sentence=The+cat+sat."))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["sentence"], "The cat sat.");
        assert_eq!(body["tokens"], json!(["The", "cat", "sat"]));
        assert_eq!(body["tagged"], json!([["The", "DT"], ["cat", "NN"], ["sat", "VBD"]]));
    }

    #[tokio::test]
    async fn test_tokenize_missing_sentence() {
        let requests = vec![
            urlencoded("/tokenize", "sentence="),
            urlencoded("/tokenize", "sentence=+++"),
            urlencoded("/tokenize", "other=1"),
            Request::builder().method("POST").uri("/tokenize").body(Body::empty()).unwrap(),
        ];

        for request in requests {
            let response = api_router(language_state()).oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(json_body(response).await, json!({"error": "No sentence provided"}));
        }
    }

    fn dashboard_state() -> DashboardState {
        let rows = vec![
            json!({"timestamp": "2024-03-01T08:00:00.000", "wait_time_seconds": "10", "talk_time_seconds": "100"}),
            json!({"timestamp": "2024-03-02T12:00:00.000", "wait_time_seconds": "25", "talk_time_seconds": "150"}),
            json!({"timestamp": "2024-03-02T18:00:00.000", "wait_time_seconds": "30", "talk_time_seconds": "120"}),
        ];
        DashboardState {
            dashboard_service: CallDashboardService::new(CallTable::from_feed(rows).unwrap(), 10),
        }
    }

    #[tokio::test]
    async fn test_dashboard_page_renders() {
        let response = dashboard_router(dashboard_state()).oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("Winnipeg 311 Call Wait Times Dashboard"));
        assert!(html.contains("value=\"2024-03-01\""));
    }

    #[tokio::test]
    async fn test_dashboard_update_defaults_to_full_range() {
        let response = dashboard_router(dashboard_state())
            .oneshot(get_request("/api/update"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["table"]["total_rows"], 3);
        assert_eq!(body["chart"]["series"].as_array().unwrap().len(), 2);
        assert_eq!(body["chart"]["series"][0]["color"], "#1f77b4");
    }

    #[tokio::test]
    async fn test_dashboard_update_single_day() {
        let response = dashboard_router(dashboard_state())
            .oneshot(get_request("/api/update?start_date=2024-03-02&end_date=2024-03-02T00:00:00"))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["table"]["total_rows"], 2);
        assert_eq!(body["table"]["rows"][0]["wait_time_seconds"], 25.0);
    }

    #[tokio::test]
    async fn test_dashboard_update_out_of_range_is_empty() {
        let response = dashboard_router(dashboard_state())
            .oneshot(get_request("/api/update?start_date=2025-01-01&end_date=2025-01-31"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["table"]["rows"], json!([]));
        assert_eq!(body["chart"]["series"], json!([]));
    }

    #[tokio::test]
    async fn test_dashboard_update_rejects_bad_date() {
        let response = dashboard_router(dashboard_state())
            .oneshot(get_request("/api/update?start_date=March"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "Invalid date: March"}));
    }

    #[tokio::test]
    async fn test_dashboard_update_rejects_bad_page() {
        let response = dashboard_router(dashboard_state())
            .oneshot(get_request("/api/update?page=abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid form data: "));
    }
}
