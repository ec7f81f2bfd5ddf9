use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{DashboardError, Result};

pub const GENDER_OPTIONS: [&str; 3] = ["Male", "Female", "Other"];
pub const RESIDENCE_OPTIONS: [&str; 3] = ["Urban", "Rural", "Suburban"];
pub const DISABILITY_OPTIONS: [&str; 3] = ["None", "Physical", "Learning"];

/// Disability value used when the field is absent from the input.
pub const DEFAULT_DISABILITY: &str = "None";

pub const MAX_INTERNAL_MARKS: f64 = 20.0;
pub const MAX_ASSIGNMENT_MARKS: f64 = 10.0;
pub const MAX_ACTIVITY_MARKS: f64 = 5.0;
pub const MAX_ATTENDANCE: f64 = 100.0;
pub const MAX_STUDY_HOURS: f64 = 40.0;

/// One student's form submission. Lives for a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentInput {
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
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Residence")]
    pub residence: String,
    #[serde(rename = "Disability", default)]
    pub disability: Option<String>,
    #[serde(rename = "Attendance_Percentage")]
    pub attendance_percentage: f64,
    #[serde(rename = "Study_Hours_Per_Week")]
    pub study_hours_per_week: f64,
    #[serde(
        rename = "Part_Time_Job",
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub part_time_job: bool,
}

impl StudentInput {
    pub fn disability(&self) -> &str {
        self.disability.as_deref().unwrap_or(DEFAULT_DISABILITY)
    }

    /// The three internal exam scores, labelled, in exam order.
    pub fn internals(&self) -> [(&'static str, f64); 3] {
        [
            ("Internal_1", self.internal_1),
            ("Internal_2", self.internal_2),
            ("Internal_3", self.internal_3),
        ]
    }

    /// Enforce the form bounds. Only the HTTP entry points call this;
    /// the pipeline itself trusts its input.
    pub fn validate(&self) -> Result<()> {
        let bounded = [
            ("Internal_1", self.internal_1, MAX_INTERNAL_MARKS),
            ("Internal_2", self.internal_2, MAX_INTERNAL_MARKS),
            ("Internal_3", self.internal_3, MAX_INTERNAL_MARKS),
            ("Assignment_Marks", self.assignment_marks, MAX_ASSIGNMENT_MARKS),
            ("Other_Activities", self.other_activities, MAX_ACTIVITY_MARKS),
            ("Attendance_Percentage", self.attendance_percentage, MAX_ATTENDANCE),
            ("Study_Hours_Per_Week", self.study_hours_per_week, MAX_STUDY_HOURS),
        ];

        for (name, value, max) in bounded {
            if !value.is_finite() || value < 0.0 || value > max {
                return Err(DashboardError::InvalidInput(format!(
                    "{} must be between 0 and {}, got {}",
                    name, max, value
                )));
            }
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match FlagRepr::deserialize(deserializer)? {
        FlagRepr::Bool(b) => Ok(b),
        FlagRepr::Int(0) => Ok(false),
        FlagRepr::Int(1) => Ok(true),
        FlagRepr::Int(n) => Err(D::Error::custom(format!(
            "Part_Time_Job must be 0 or 1, got {}",
            n
        ))),
        FlagRepr::Text(s) => match s.trim() {
            "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            other => Err(D::Error::custom(format!(
                "Part_Time_Job must be 0 or 1, got {:?}",
                other
            ))),
        },
    }
}

fn serialize_flag<S>(flag: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*flag))
}

/// Letter grade produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub const ALL: [Grade; 6] = [Grade::APlus, Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];

    pub fn label(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    /// Background color of the grade badge.
    pub fn badge_color(self) -> &'static str {
        match self {
            Grade::APlus => "darkgreen",
            Grade::A => "green",
            Grade::B => "blue",
            Grade::C => "orange",
            Grade::D => "red",
            Grade::F => "darkred",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Grade::ALL
            .into_iter()
            .find(|g| g.label() == s.trim())
            .ok_or_else(|| format!("unknown grade label {:?}", s))
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub(crate) fn sample_student() -> StudentInput {
    StudentInput {
        internal_1: 18.0,
        internal_2: 15.0,
        internal_3: 19.0,
        assignment_marks: 9.0,
        other_activities: 4.0,
        gender: "Male".to_string(),
        residence: "Urban".to_string(),
        disability: Some("None".to_string()),
        attendance_percentage: 90.0,
        study_hours_per_week: 12.0,
        part_time_job: false,
    }
}
