use serde::Serialize;
use std::collections::BTreeMap;

use crate::data::{Grade, StudentInput};
use crate::error::{DashboardError, Result};
use crate::features::{prepare_student_data, FeatureVector, PerformanceSummary};
use crate::model::{ModelArtifacts, ModelStore};
use crate::radar::{create_performance_radar, RadarChart};
use crate::recommendations::{generate_detailed_recommendations, RecommendationSet};

/// Everything the dashboard renders for one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub grade: Grade,
    pub badge_color: &'static str,
    pub confidence: Option<f64>,
    pub summary: PerformanceSummary,
    pub features: FeatureVector,
    pub radar: RadarChart,
    pub recommendations: RecommendationSet,
}

pub fn analyze(input: &StudentInput, artifacts: &ModelArtifacts) -> Result<AnalysisReport> {
    let prepared = prepare_student_data(input, artifacts.encoders.as_ref());
    let prediction = artifacts.classifier.predict(&prepared.features)?;

    tracing::debug!(
        "predicted grade {} (confidence {:?}) for total marks {}",
        prediction.grade,
        prediction.confidence,
        prepared.summary.total_marks
    );

    Ok(AnalysisReport {
        grade: prediction.grade,
        badge_color: prediction.grade.badge_color(),
        confidence: prediction.confidence,
        summary: prepared.summary,
        features: prepared.features,
        radar: create_performance_radar(input),
        recommendations: generate_detailed_recommendations(input, prediction.grade),
    })
}

/// Fetch the artifacts first; when they are unavailable nothing else runs.
pub fn analyze_student(store: &ModelStore, input: &StudentInput) -> Result<AnalysisReport> {
    let artifacts = store.get()?;
    analyze(input, &artifacts)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub row: usize,
    pub report: AnalysisReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub grade_distribution: BTreeMap<String, usize>,
    pub avg_performance_percentage: f64,
    /// Students with at least one weak internal exam.
    pub students_with_weak_internals: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub total_students: usize,
    pub results: Vec<BatchEntry>,
    pub summary: BatchSummary,
}

/// Parse CSV rows (header names as in the form payload) into inputs.
/// Row numbers are 1-based and exclude the header.
pub fn parse_batch_csv(data: &[u8]) -> Result<Vec<StudentInput>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(data);
    let mut students = Vec::new();

    for (idx, record) in rdr.deserialize::<StudentInput>().enumerate() {
        let row = idx + 1;
        let student = record.map_err(|e| DashboardError::InvalidBatch {
            row,
            reason: e.to_string(),
        })?;
        student.validate().map_err(|e| DashboardError::InvalidBatch {
            row,
            reason: e.to_string(),
        })?;
        students.push(student);
    }

    if students.is_empty() {
        return Err(DashboardError::InvalidInput(
            "No valid student data found. Please check CSV format.".to_string(),
        ));
    }

    Ok(students)
}

pub fn analyze_batch(store: &ModelStore, students: &[StudentInput]) -> Result<BatchReport> {
    let artifacts = store.get()?;

    let mut results = Vec::with_capacity(students.len());
    for (idx, student) in students.iter().enumerate() {
        results.push(BatchEntry {
            row: idx + 1,
            report: analyze(student, &artifacts)?,
        });
    }

    let mut grade_distribution = BTreeMap::new();
    for entry in &results {
        *grade_distribution.entry(entry.report.grade.to_string()).or_insert(0) += 1;
    }

    let total_students = results.len();
    let avg_performance_percentage = if total_students > 0 {
        results
            .iter()
            .map(|e| e.report.summary.performance_percentage)
            .sum::<f64>()
            / total_students as f64
    } else {
        0.0
    };
    let students_with_weak_internals = results
        .iter()
        .filter(|e| !e.report.recommendations.internal_analysis.is_empty())
        .count();

    tracing::info!("analyzed batch of {} students", total_students);

    Ok(BatchReport {
        total_students,
        results,
        summary: BatchSummary {
            grade_distribution,
            avg_performance_percentage,
            students_with_weak_internals,
        },
    })
}
