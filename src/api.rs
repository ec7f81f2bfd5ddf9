use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::{analyze_batch, analyze_student, parse_batch_csv};
use crate::data::{Grade, StudentInput, DISABILITY_OPTIONS, GENDER_OPTIONS, RESIDENCE_OPTIONS};
use crate::error::DashboardError;
use crate::model::ModelStore;

const DASHBOARD_PAGE: &str = include_str!("dashboard.html");

#[derive(Serialize)]
struct ModelInfo {
    available: bool,
    model_dir: Option<String>,
    classifier: Option<&'static str>,
    classes: Vec<Grade>,
    encoder_categories: Option<BTreeMap<&'static str, Vec<String>>>,
    error: Option<String>,
}

#[derive(Serialize)]
struct FormOptions {
    #[serde(rename = "Gender")]
    gender: [&'static str; 3],
    #[serde(rename = "Residence")]
    residence: [&'static str; 3],
    #[serde(rename = "Disability")]
    disability: [&'static str; 3],
}

// Single-student analysis
async fn analyze_performance(
    req: web::Json<StudentInput>,
    store: web::Data<ModelStore>,
) -> Result<HttpResponse, DashboardError> {
    let input = req.into_inner();
    input.validate()?;

    // Artifact loading touches the filesystem; keep it off the worker thread.
    let report = web::block(move || analyze_student(&store, &input)).await??;
    Ok(HttpResponse::Ok().json(report))
}

// Batch analysis from CSV
async fn batch_analyze(
    body: web::Bytes,
    store: web::Data<ModelStore>,
) -> Result<HttpResponse, DashboardError> {
    let students = parse_batch_csv(&body)?;
    let report = web::block(move || analyze_batch(&store, &students)).await??;
    Ok(HttpResponse::Ok().json(report))
}

async fn get_model_info(store: web::Data<ModelStore>) -> HttpResponse {
    let model_dir = store.dir().map(|d| d.display().to_string());
    let loaded = web::block(move || store.get())
        .await
        .map_err(DashboardError::from)
        .and_then(|r| r);

    let info = match loaded {
        Ok(artifacts) => ModelInfo {
            available: true,
            model_dir,
            classifier: Some(artifacts.classifier.kind()),
            classes: artifacts.classifier.classes().to_vec(),
            encoder_categories: artifacts.encoder_set.as_ref().map(|e| e.categories()),
            error: None,
        },
        Err(e) => ModelInfo {
            available: false,
            model_dir,
            classifier: None,
            classes: Vec::new(),
            encoder_categories: None,
            error: Some(e.to_string()),
        },
    };

    HttpResponse::Ok().json(info)
}

async fn get_form_options() -> HttpResponse {
    HttpResponse::Ok().json(FormOptions {
        gender: GENDER_OPTIONS,
        residence: RESIDENCE_OPTIONS,
        disability: DISABILITY_OPTIONS,
    })
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("Student Performance Dashboard is running!")
}

async fn serve_dashboard() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(DASHBOARD_PAGE)
}

fn json_error(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    DashboardError::InvalidInput(err.to_string()).into()
}

/// Routes and extractor settings; `ModelStore` must be registered as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/", web::get().to(serve_dashboard))
        .route("/analyze", web::post().to(analyze_performance))
        .route("/batch-analyze", web::post().to(batch_analyze))
        .route("/model/info", web::get().to(get_model_info))
        .route("/options", web::get().to(get_form_options))
        .route("/health", web::get().to(health_check));
}
