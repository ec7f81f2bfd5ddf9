//! HTTP-level tests for the dashboard API, using a stub classifier.

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use student_dashboard::api;
use student_dashboard::encoding::{EncoderSet, LabelEncoder};
use student_dashboard::features::FeatureVector;
use student_dashboard::model::{GradeClassifier, GradePrediction, ModelArtifacts, ModelStore};
use student_dashboard::{Grade, Result};

/// Grades by total marks so different students get different answers.
struct ThresholdClassifier;

impl GradeClassifier for ThresholdClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<GradePrediction> {
        let grade = match features.total_marks {
            m if m >= 65.0 => Grade::APlus,
            m if m >= 55.0 => Grade::A,
            m if m >= 45.0 => Grade::B,
            m if m >= 35.0 => Grade::C,
            m if m >= 25.0 => Grade::D,
            _ => Grade::F,
        };
        Ok(GradePrediction { grade, confidence: Some(0.9) })
    }

    fn kind(&self) -> &'static str {
        "threshold"
    }

    fn classes(&self) -> &[Grade] {
        &Grade::ALL
    }
}

fn encoders() -> EncoderSet {
    EncoderSet {
        gender: LabelEncoder::new(["Female", "Male", "Other"]),
        residence: LabelEncoder::new(["Rural", "Suburban", "Urban"]),
        disability: LabelEncoder::new(["Learning", "None", "Physical"]),
    }
}

fn stub_store() -> ModelStore {
    ModelStore::with_artifacts(ModelArtifacts::new(
        Arc::new(ThresholdClassifier),
        Arc::new(encoders()),
    ))
}

fn reference_student() -> Value {
    json!({
        "Internal_1": 18, "Internal_2": 15, "Internal_3": 19,
        "Assignment_Marks": 9, "Other_Activities": 4,
        "Gender": "Male", "Residence": "Urban", "Disability": "None",
        "Attendance_Percentage": 90, "Study_Hours_Per_Week": 12,
        "Part_Time_Job": 0
    })
}

macro_rules! app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($store))
                .configure(api::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_analyze_reference_student() {
    let app = app!(stub_store());
    let req = test::TestRequest::post()
        .uri("/analyze")
        .set_json(reference_student())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["grade"], "A+");
    assert_eq!(body["badge_color"], "darkgreen");
    assert_eq!(body["summary"]["total_internal_marks"], 52.0);
    assert_eq!(body["summary"]["total_marks"], 65.0);
    assert_eq!(
        body["features"],
        json!({
            "Internal_1": 18.0, "Internal_2": 15.0, "Internal_3": 19.0,
            "Assignment_Marks": 9.0, "Other_Activities": 4.0,
            "Total_Internal_Marks": 52.0, "Total_Marks": 65.0,
            "Gender_Encoded": 1, "Residence_Encoded": 2, "Disability_Encoded": 1,
            "Attendance_Percentage": 90.0, "Study_Hours_Per_Week": 12.0,
            "Part_Time_Job": 0
        })
    );
    assert_eq!(body["radar"]["values"], json!([90.0, 75.0, 95.0, 90.0, 80.0, 90.0, 30.0]));
    assert_eq!(
        body["recommendations"]["grade_specific"][0]["message"],
        "Pursue Advanced Academic Challenges"
    );
    assert_eq!(body["recommendations"]["internal_analysis"], json!([]));
    assert_eq!(body["recommendations"]["improvement_strategies"][0]["type"], "Skill");
}

#[actix_web::test]
async fn test_failing_student_gets_weakness_cards_and_no_grade_cards() {
    let app = app!(stub_store());
    let mut student = reference_student();
    student["Internal_1"] = json!(5);
    student["Internal_2"] = json!(9.9);
    student["Internal_3"] = json!(10);
    student["Assignment_Marks"] = json!(1);
    student["Other_Activities"] = json!(0);

    let req = test::TestRequest::post().uri("/analyze").set_json(student).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    // 5 + 9.9 + 10 + 1 = 25.9
    assert_eq!(body["grade"], "D");
    let weak = body["recommendations"]["internal_analysis"].as_array().unwrap();
    assert_eq!(weak.len(), 2);
    assert_eq!(weak[1]["message"], "Critical Improvement Needed in Internal_2");
}

#[actix_web::test]
async fn test_unseen_category_degrades_silently() {
    let app = app!(stub_store());
    let mut student = reference_student();
    student["Gender"] = json!("Prefer not to say");
    student.as_object_mut().unwrap().remove("Disability");

    let req = test::TestRequest::post().uri("/analyze").set_json(student).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["features"]["Gender_Encoded"], 0);
    assert_eq!(body["features"]["Disability_Encoded"], 1);
}

#[actix_web::test]
async fn test_out_of_range_input_is_rejected() {
    let app = app!(stub_store());
    let mut student = reference_student();
    student["Study_Hours_Per_Week"] = json!(41);

    let req = test::TestRequest::post().uri("/analyze").set_json(student).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Study_Hours_Per_Week"));
}

#[actix_web::test]
async fn test_bad_part_time_job_is_rejected() {
    let app = app!(stub_store());
    let mut student = reference_student();
    student["Part_Time_Job"] = json!(3);

    let req = test::TestRequest::post().uri("/analyze").set_json(student).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_missing_artifacts_return_only_the_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(ModelStore::new(dir.path().join("student_performance_models")));

    let req = test::TestRequest::post()
        .uri("/analyze")
        .set_json(reference_student())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = test::read_body_json(resp).await;
    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Model files not found. Please ensure model training is complete."));
}

#[actix_web::test]
async fn test_batch_analyze() {
    let app = app!(stub_store());
    let csv = "\
Internal_1,Internal_2,Internal_3,Assignment_Marks,Other_Activities,Gender,Residence,Disability,Attendance_Percentage,Study_Hours_Per_Week,Part_Time_Job
18,15,19,9,4,Male,Urban,None,90,12,0
8,12,9.5,6,2,Female,Rural,Learning,70,6,1
";
    let req = test::TestRequest::post()
        .uri("/batch-analyze")
        .insert_header(("content-type", "text/csv"))
        .set_payload(csv)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_students"], 2);
    assert_eq!(body["results"][0]["report"]["grade"], "A+");
    // 8 + 12 + 9.5 + 6 + 2 = 37.5
    assert_eq!(body["results"][1]["report"]["grade"], "C");
    assert_eq!(body["summary"]["grade_distribution"], json!({"A+": 1, "C": 1}));
    assert_eq!(body["summary"]["students_with_weak_internals"], 1);
}

#[actix_web::test]
async fn test_batch_reports_bad_row() {
    let app = app!(stub_store());
    let csv = "\
Internal_1,Internal_2,Internal_3,Assignment_Marks,Other_Activities,Gender,Residence,Disability,Attendance_Percentage,Study_Hours_Per_Week,Part_Time_Job
18,15,19,9,4,Male,Urban,None,90,12,0
18,15,19,9,four,Male,Urban,None,90,12,0
";
    let req = test::TestRequest::post()
        .uri("/batch-analyze")
        .set_payload(csv)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid batch row 2"));
}

#[actix_web::test]
async fn test_model_info_and_options() {
    let app = app!(stub_store());

    let req = test::TestRequest::get().uri("/model/info").to_request();
    let info: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(info["available"], true);
    assert_eq!(info["classifier"], "threshold");
    assert_eq!(info["classes"], json!(["A+", "A", "B", "C", "D", "F"]));

    let req = test::TestRequest::get().uri("/options").to_request();
    let options: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(options["Gender"], json!(["Male", "Female", "Other"]));
    assert_eq!(options["Disability"][0], "None");
}

#[actix_web::test]
async fn test_dashboard_page_and_health() {
    let app = app!(stub_store());

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = test::read_body(resp).await;
    let page = std::str::from_utf8(&page).unwrap();
    assert!(page.contains("Student Performance Intelligence Dashboard"));
    assert!(page.contains("Analyze Performance"));

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
