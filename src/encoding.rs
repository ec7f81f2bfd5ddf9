//! Categorical encoders fitted during model training.
//!
//! An encoder maps each category it saw during fitting to its index in
//! the fitted class list. Values it never saw are not an error for the
//! dashboard: [`CategoricalEncoder::transform_or_zero`] collapses them to
//! code 0, the same code as the first fitted category.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{DashboardError, Result};
use crate::model::read_artifact;

/// Categorical columns the classifier was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoricalField {
    Gender,
    Residence,
    Disability,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 3] = [
        CategoricalField::Gender,
        CategoricalField::Residence,
        CategoricalField::Disability,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::Gender => "Gender",
            CategoricalField::Residence => "Residence",
            CategoricalField::Disability => "Disability",
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encoding capability consumed by the feature preparer.
pub trait CategoricalEncoder: Send + Sync {
    /// Code for `value`, or `None` if the encoder never saw it.
    fn transform(&self, field: CategoricalField, value: &str) -> Option<u32>;

    fn transform_or_zero(&self, field: CategoricalField, value: &str) -> u32 {
        self.transform(field, value).unwrap_or(0)
    }
}

/// A fitted label encoder: the code of a value is its position in `classes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LabelEncoder {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, value: &str) -> Option<u32> {
        self.classes
            .iter()
            .position(|c| c == value)
            .map(|idx| idx as u32)
    }
}

/// The encoder collection stored in `label_encoders.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderSet {
    #[serde(rename = "Gender")]
    pub gender: LabelEncoder,
    #[serde(rename = "Residence")]
    pub residence: LabelEncoder,
    #[serde(rename = "Disability")]
    pub disability: LabelEncoder,
}

impl EncoderSet {
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_artifact(path)?;
        let encoders: EncoderSet = serde_json::from_str(&text)
            .map_err(|e| DashboardError::invalid_artifact(path, e.to_string()))?;

        for field in CategoricalField::ALL {
            if encoders.encoder(field).classes().is_empty() {
                return Err(DashboardError::invalid_artifact(
                    path,
                    format!("encoder for {} has no classes", field),
                ));
            }
        }

        Ok(encoders)
    }

    pub fn encoder(&self, field: CategoricalField) -> &LabelEncoder {
        match field {
            CategoricalField::Gender => &self.gender,
            CategoricalField::Residence => &self.residence,
            CategoricalField::Disability => &self.disability,
        }
    }

    /// Categories per field, for the model info endpoint.
    pub fn categories(&self) -> BTreeMap<&'static str, Vec<String>> {
        CategoricalField::ALL
            .into_iter()
            .map(|field| (field.name(), self.encoder(field).classes().to_vec()))
            .collect()
    }
}

impl CategoricalEncoder for EncoderSet {
    fn transform(&self, field: CategoricalField, value: &str) -> Option<u32> {
        self.encoder(field).transform(value)
    }
}

#[cfg(test)]
pub(crate) fn fitted_encoders() -> EncoderSet {
    // Fitted class lists are sorted, as the training pipeline produces them.
    EncoderSet {
        gender: LabelEncoder::new(["Female", "Male", "Other"]),
        residence: LabelEncoder::new(["Rural", "Suburban", "Urban"]),
        disability: LabelEncoder::new(["Learning", "None", "Physical"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_known_values_encode_to_class_index() {
        let encoders = fitted_encoders();
        assert_eq!(encoders.transform(CategoricalField::Gender, "Male"), Some(1));
        assert_eq!(encoders.transform(CategoricalField::Residence, "Urban"), Some(2));
        assert_eq!(encoders.transform(CategoricalField::Disability, "None"), Some(1));
    }

    #[test]
    fn test_unseen_values_fall_back_to_zero() {
        let encoders = fitted_encoders();
        assert_eq!(encoders.transform(CategoricalField::Gender, "Nonbinary"), None);
        assert_eq!(encoders.transform_or_zero(CategoricalField::Gender, "Nonbinary"), 0);
        // Same code as the category fitted at index 0.
        assert_eq!(
            encoders.transform_or_zero(CategoricalField::Gender, "Nonbinary"),
            encoders.transform_or_zero(CategoricalField::Gender, "Female")
        );
        assert_eq!(encoders.transform_or_zero(CategoricalField::Residence, "urban"), 0);
    }

    #[test]
    fn test_load_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"Gender":["Female","Male"],"Residence":["Rural","Urban"],"Disability":["None"]}}"#
        )
        .unwrap();

        let encoders = EncoderSet::load(file.path()).unwrap();
        assert_eq!(encoders.transform(CategoricalField::Residence, "Urban"), Some(1));
        assert_eq!(encoders.categories()["Disability"], vec!["None".to_string()]);
    }

    #[test]
    fn test_load_rejects_missing_field() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Gender":["Female","Male"],"Residence":["Rural"]}}"#).unwrap();

        let err = EncoderSet::load(file.path()).unwrap_err();
        assert!(matches!(err, DashboardError::ArtifactInvalid { .. }));
    }

    #[test]
    fn test_load_rejects_empty_encoder() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Gender":[],"Residence":["Rural"],"Disability":["None"]}}"#).unwrap();

        assert!(EncoderSet::load(file.path()).is_err());
    }
}
