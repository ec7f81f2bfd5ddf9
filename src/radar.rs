use serde::Serialize;

use crate::data::{StudentInput, MAX_ACTIVITY_MARKS, MAX_ASSIGNMENT_MARKS, MAX_INTERNAL_MARKS};

pub const RADAR_AXES: [&str; 7] = [
    "Internal 1",
    "Internal 2",
    "Internal 3",
    "Assignment",
    "Activities",
    "Attendance",
    "Study Hours",
];

/// Each study hour is worth 2.5 points, capped at 100 (40 h/week).
pub const STUDY_HOURS_SCALE: f64 = 2.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarChart {
    pub categories: [&'static str; 7],
    pub values: [f64; 7],
}

impl RadarChart {
    /// (category, value) pairs with the first point repeated, closing the polygon.
    pub fn closed_polygon(&self) -> Vec<(&'static str, f64)> {
        let mut points: Vec<(&'static str, f64)> =
            self.categories.iter().copied().zip(self.values).collect();
        points.push((self.categories[0], self.values[0]));
        points
    }
}

/// Scale every axis to 0-100. Only study hours is clamped; the other
/// axes rely on the input already being within its form bounds.
pub fn create_performance_radar(input: &StudentInput) -> RadarChart {
    RadarChart {
        categories: RADAR_AXES,
        values: [
            input.internal_1 / MAX_INTERNAL_MARKS * 100.0,
            input.internal_2 / MAX_INTERNAL_MARKS * 100.0,
            input.internal_3 / MAX_INTERNAL_MARKS * 100.0,
            input.assignment_marks / MAX_ASSIGNMENT_MARKS * 100.0,
            input.other_activities / MAX_ACTIVITY_MARKS * 100.0,
            input.attendance_percentage,
            (input.study_hours_per_week * STUDY_HOURS_SCALE).min(100.0),
        ],
    }
}
