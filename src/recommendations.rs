//! Rule-based recommendation cards.
//!
//! Three groups, always in this order: cards for the predicted grade,
//! one card per weak internal exam, then the generic strategies.

use serde::Serialize;
use std::borrow::Cow;

use crate::data::{Grade, StudentInput};

/// Internal exam scores below this (out of 20) get a weakness card.
pub const INTERNAL_WEAKNESS_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationCard {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: Cow<'static, str>,
    pub icon: &'static str,
    pub color: &'static str,
}

const fn card(
    kind: &'static str,
    message: &'static str,
    icon: &'static str,
    color: &'static str,
) -> RecommendationCard {
    RecommendationCard {
        kind,
        message: Cow::Borrowed(message),
        icon,
        color,
    }
}

static A_PLUS_CARDS: [RecommendationCard; 2] = [
    card("Excellence", "Pursue Advanced Academic Challenges", "🏆", "green"),
    card("Opportunity", "Consider Research or Mentorship Programs", "🔬", "green"),
];

static A_CARDS: [RecommendationCard; 2] = [
    card("Consistent", "Maintain High Performance, Explore Depth", "📈", "darkgreen"),
    card("Growth", "Develop Interdisciplinary Skills", "🌱", "darkgreen"),
];

static B_CARDS: [RecommendationCard; 2] = [
    card("Potential", "Focus on Targeted Academic Improvement", "🎯", "blue"),
    card("Strategy", "Develop Advanced Study Techniques", "📚", "blue"),
];

static C_CARDS: [RecommendationCard; 2] = [
    card("Alert", "Requires Comprehensive Academic Support", "⚠️", "orange"),
    card("Action", "Implement Structured Learning Plan", "📋", "orange"),
];

static D_CARDS: [RecommendationCard; 2] = [
    card("Critical", "Immediate Academic Intervention Needed", "🚨", "red"),
    card("Support", "Seek Personalized Tutoring", "🤝", "red"),
];

static IMPROVEMENT_STRATEGIES: [RecommendationCard; 2] = [
    card("Skill", "Enhance Time Management", "⏰", "purple"),
    card("Learning", "Develop Active Study Techniques", "💡", "teal"),
];

/// Cards for a grade. F has no entry.
pub fn grade_cards(grade: Grade) -> &'static [RecommendationCard] {
    match grade {
        Grade::APlus => &A_PLUS_CARDS,
        Grade::A => &A_CARDS,
        Grade::B => &B_CARDS,
        Grade::C => &C_CARDS,
        Grade::D => &D_CARDS,
        Grade::F => &[],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationSet {
    pub grade_specific: Vec<RecommendationCard>,
    pub internal_analysis: Vec<RecommendationCard>,
    pub improvement_strategies: Vec<RecommendationCard>,
}

impl RecommendationSet {
    /// All cards in display order.
    pub fn iter(&self) -> impl Iterator<Item = &RecommendationCard> {
        self.grade_specific
            .iter()
            .chain(&self.internal_analysis)
            .chain(&self.improvement_strategies)
    }
}

pub fn generate_detailed_recommendations(input: &StudentInput, grade: Grade) -> RecommendationSet {
    let internal_analysis = input
        .internals()
        .into_iter()
        .filter(|(_, marks)| *marks < INTERNAL_WEAKNESS_THRESHOLD)
        .map(|(name, _)| RecommendationCard {
            kind: "Weakness",
            message: Cow::Owned(format!("Critical Improvement Needed in {}", name)),
            icon: "🔍",
            color: "red",
        })
        .collect();

    RecommendationSet {
        grade_specific: grade_cards(grade).to_vec(),
        internal_analysis,
        improvement_strategies: IMPROVEMENT_STRATEGIES.to_vec(),
    }
}
