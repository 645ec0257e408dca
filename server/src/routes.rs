//! HTTP routes: health check, landing page, and deck generation.

use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use deckify::{build_deck, heuristic_outline, Outline, RemoteConfig, RemotePlanner};

/// Maximum template upload size.
const MAX_TEMPLATE_MB: usize = 20;

/// Accepted template extensions.
const ALLOWED_EXTS: &[&str] = &[".pptx", ".potx"];

/// Provider used when the form omits one but carries a key.
const DEFAULT_PROVIDER: &str = "openai";

const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Build the service router.
pub fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/generate", post(generate))
        // Leave headroom above the template cap for the text fields.
        .layer(DefaultBodyLimit::max((MAX_TEMPLATE_MB + 4) * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "ts": Utc::now().to_rfc3339() }))
}

async fn index() -> Html<&'static str> {
    Html(
        "<!doctype html><html><head><title>deckify</title></head><body>\
         <h1>deckify</h1>\
         <p>POST multipart form data to <code>/api/generate</code> with fields\
         <code>text</code>, <code>guidance</code>, <code>provider</code>,\
         <code>model</code>, <code>api_key</code>, <code>base_url</code>,\
         <code>include_notes</code> and a <code>template</code> file\
         (.pptx or .potx) to download a generated deck.</p>\
         </body></html>",
    )
}

/// Form fields collected from the multipart request.
#[derive(Default)]
struct GenerateForm {
    text: Option<String>,
    guidance: String,
    provider: String,
    model: String,
    api_key: String,
    base_url: String,
    include_notes: bool,
    template_name: Option<String>,
    template_bytes: Option<Vec<u8>>,
}

/// Reject templates with the wrong extension or an oversized payload.
fn validate_template(filename: &str, size: usize) -> Result<(), (StatusCode, String)> {
    let lower = filename.to_lowercase();
    if !ALLOWED_EXTS.iter().any(|ext| lower.ends_with(ext)) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Unsupported file type: {}. Allowed: {}",
                filename,
                ALLOWED_EXTS.join(", ")
            ),
        ));
    }
    let size_mb = size as f64 / (1024.0 * 1024.0);
    if size_mb > MAX_TEMPLATE_MB as f64 {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            format!(
                "Template too large ({:.1} MB). Max is {} MB.",
                size_mb, MAX_TEMPLATE_MB
            ),
        ));
    }
    Ok(())
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "on" | "yes")
}

async fn read_form(mut multipart: Multipart) -> Result<GenerateForm, (StatusCode, String)> {
    let mut form = GenerateForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Malformed multipart body: {}", e),
        )
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "template" => {
                form.template_name = field.file_name().map(String::from);
                let bytes = field.bytes().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read template upload: {}", e),
                    )
                })?;
                form.template_bytes = Some(bytes.to_vec());
            }
            _ => {
                let value = field.text().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read field {}: {}", name, e),
                    )
                })?;
                match name.as_str() {
                    "text" => form.text = Some(value),
                    "guidance" => form.guidance = value,
                    "provider" => form.provider = value,
                    "model" => form.model = value,
                    "api_key" => form.api_key = value,
                    "base_url" => form.base_url = value,
                    "include_notes" => form.include_notes = parse_bool(&value),
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

/// Plan remotely when the request carries a credential, falling back to
/// the heuristic on any failure; the heuristic is the safety net.
async fn plan_outline(form: &GenerateForm, text: &str) -> Outline {
    if form.api_key.is_empty() {
        return heuristic_outline(text, &form.guidance, form.include_notes);
    }

    let provider = if form.provider.is_empty() {
        DEFAULT_PROVIDER
    } else {
        &form.provider
    };

    let planned = match RemoteConfig::new(provider, form.api_key.clone()) {
        Ok(config) => {
            let config = config
                .with_model(form.model.clone())
                .with_base_url(form.base_url.clone());
            match RemotePlanner::new(config) {
                Ok(planner) => planner.plan(text, &form.guidance, form.include_notes).await,
                Err(e) => Err(e),
            }
        }
        Err(e) => Err(e),
    };

    match planned {
        Ok(outline) => outline,
        Err(e) => {
            // Never log the key; the error text carries provider detail only.
            tracing::warn!("remote outline failed, using heuristic: {}", e);
            heuristic_outline(text, &form.guidance, form.include_notes)
        }
    }
}

async fn generate(multipart: Multipart) -> Result<Response, (StatusCode, String)> {
    let form = read_form(multipart).await?;

    let text = form
        .text
        .clone()
        .ok_or((StatusCode::BAD_REQUEST, "Missing field: text".to_string()))?;
    let template_bytes = form.template_bytes.as_deref().ok_or((
        StatusCode::BAD_REQUEST,
        "Missing file field: template".to_string(),
    ))?;
    let template_name = form.template_name.as_deref().unwrap_or("template.pptx");
    validate_template(template_name, template_bytes.len())?;

    let outline = plan_outline(&form, &text).await;

    let deck = build_deck(&outline, template_bytes).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to build PowerPoint: {}", e),
        )
    })?;

    tracing::info!(
        slides = outline.estimated_slide_count,
        bytes = deck.len(),
        "deck generated"
    );

    let filename = format!("deckify-{}.pptx", Utc::now().format("%Y%m%d-%H%M%S"));
    let headers = [
        (header::CONTENT_TYPE, PPTX_MIME.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];
    Ok((headers, deck).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[test]
    fn test_validate_template_extension() {
        assert!(validate_template("deck.pptx", 1024).is_ok());
        assert!(validate_template("DECK.POTX", 1024).is_ok());

        let (status, detail) = validate_template("notes.docx", 1024).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(detail.contains(".pptx"));
    }

    #[test]
    fn test_validate_template_size() {
        let (status, _) =
            validate_template("deck.pptx", (MAX_TEMPLATE_MB + 1) * 1024 * 1024).unwrap_err();
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        assert!(validate_template("deck.pptx", MAX_TEMPLATE_MB * 1024 * 1024).is_ok());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(parse_bool("On"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }

    #[tokio::test]
    async fn test_healthz() {
        let app = router();
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/healthz")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["ok"], true);
        assert!(value["ts"].is_string());
    }

    #[tokio::test]
    async fn test_index_mentions_endpoint() {
        let app = router();
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(std::str::from_utf8(&body).unwrap().contains("/api/generate"));
    }
}
