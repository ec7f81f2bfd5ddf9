use ndarray::Array1;
use serde::Serialize;

use crate::data::{StudentInput, MAX_ACTIVITY_MARKS, MAX_ASSIGNMENT_MARKS, MAX_INTERNAL_MARKS};
use crate::encoding::{CategoricalEncoder, CategoricalField};

pub const FEATURE_COUNT: usize = 13;

/// Column order the classifier was trained with. Reordering breaks predictions.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Internal_1",
    "Internal_2",
    "Internal_3",
    "Assignment_Marks",
    "Other_Activities",
    "Total_Internal_Marks",
    "Total_Marks",
    "Gender_Encoded",
    "Residence_Encoded",
    "Disability_Encoded",
    "Attendance_Percentage",
    "Study_Hours_Per_Week",
    "Part_Time_Job",
];

/// 3 x 20 + 10 + 5
pub const MAX_TOTAL_MARKS: f64 =
    MAX_INTERNAL_MARKS * 3.0 + MAX_ASSIGNMENT_MARKS + MAX_ACTIVITY_MARKS;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    #[serde(rename = "Internal_1")]
    pub internal_1: f64,
    #[serde(rename = "Internal_2")]
    pub internal_2: f64,
    #[serde(rename = "Internal_3")]
    pub internal_3: f64,
    #[serde(rename = "Assignment_Marks")]
    pub assignment_marks: f64,
    #[serde(rename = "Other_Activities")]
    pub other_activities: f64,
    #[serde(rename = "Total_Internal_Marks")]
    pub total_internal_marks: f64,
    #[serde(rename = "Total_Marks")]
    pub total_marks: f64,
    #[serde(rename = "Gender_Encoded")]
    pub gender_encoded: u32,
    #[serde(rename = "Residence_Encoded")]
    pub residence_encoded: u32,
    #[serde(rename = "Disability_Encoded")]
    pub disability_encoded: u32,
    #[serde(rename = "Attendance_Percentage")]
    pub attendance_percentage: f64,
    #[serde(rename = "Study_Hours_Per_Week")]
    pub study_hours_per_week: f64,
    #[serde(rename = "Part_Time_Job")]
    pub part_time_job: u8,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.internal_1,
            self.internal_2,
            self.internal_3,
            self.assignment_marks,
            self.other_activities,
            self.total_internal_marks,
            self.total_marks,
            f64::from(self.gender_encoded),
            f64::from(self.residence_encoded),
            f64::from(self.disability_encoded),
            self.attendance_percentage,
            self.study_hours_per_week,
            f64::from(self.part_time_job),
        ]
    }

    pub fn to_row(&self) -> Array1<f64> {
        Array1::from(self.to_array().to_vec())
    }

    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.to_array())
    }
}

/// Derived totals shown alongside the prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub total_internal_marks: f64,
    pub total_marks: f64,
    /// Total_Marks / 75 x 100. Not a classifier input.
    pub performance_percentage: f64,
}

impl PerformanceSummary {
    pub fn from_input(input: &StudentInput) -> Self {
        let total_internal_marks = input.internal_1 + input.internal_2 + input.internal_3;
        let total_marks = total_internal_marks + input.assignment_marks + input.other_activities;

        PerformanceSummary {
            total_internal_marks,
            total_marks,
            performance_percentage: total_marks / MAX_TOTAL_MARKS * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedStudent {
    pub features: FeatureVector,
    pub summary: PerformanceSummary,
}

pub fn prepare_student_data(input: &StudentInput, encoders: &dyn CategoricalEncoder) -> PreparedStudent {
    let summary = PerformanceSummary::from_input(input);

    let features = FeatureVector {
        internal_1: input.internal_1,
        internal_2: input.internal_2,
        internal_3: input.internal_3,
        assignment_marks: input.assignment_marks,
        other_activities: input.other_activities,
        total_internal_marks: summary.total_internal_marks,
        total_marks: summary.total_marks,
        gender_encoded: encoders.transform_or_zero(CategoricalField::Gender, &input.gender),
        residence_encoded: encoders.transform_or_zero(CategoricalField::Residence, &input.residence),
        disability_encoded: encoders.transform_or_zero(CategoricalField::Disability, input.disability()),
        attendance_percentage: input.attendance_percentage,
        study_hours_per_week: input.study_hours_per_week,
        part_time_job: u8::from(input.part_time_job),
    };

    PreparedStudent { features, summary }
}
