use ndarray::{Array1, Array2};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::Grade;
use crate::encoding::{CategoricalEncoder, EncoderSet};
use crate::error::{DashboardError, Result};
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

pub const MODEL_FILE: &str = "performance_model.json";
pub const ENCODERS_FILE: &str = "label_encoders.json";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradePrediction {
    pub grade: Grade,
    /// Probability of `grade`, when the classifier exposes one.
    pub confidence: Option<f64>,
}

/// Prediction capability of a trained classifier.
pub trait GradeClassifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<GradePrediction>;

    fn kind(&self) -> &'static str;

    fn classes(&self) -> &[Grade];
}

// Multinomial linear model

#[derive(Debug, Clone)]
pub struct LogisticModel {
    classes: Vec<Grade>,
    coefficients: Array2<f64>,
    intercepts: Array1<f64>,
}

impl LogisticModel {
    pub fn new(classes: Vec<Grade>, coefficients: Vec<Vec<f64>>, intercepts: Vec<f64>) -> std::result::Result<Self, String> {
        if classes.is_empty() {
            return Err("classifier has no classes".to_string());
        }
        if coefficients.len() != classes.len() || intercepts.len() != classes.len() {
            return Err(format!(
                "expected {} coefficient rows and intercepts, got {} and {}",
                classes.len(),
                coefficients.len(),
                intercepts.len()
            ));
        }
        if let Some(row) = coefficients.iter().find(|row| row.len() != FEATURE_COUNT) {
            return Err(format!(
                "coefficient row has {} weights, expected {}",
                row.len(),
                FEATURE_COUNT
            ));
        }
        if coefficients.iter().flatten().chain(&intercepts).any(|w| !w.is_finite()) {
            return Err("coefficients and intercepts must be finite".to_string());
        }

        let n_classes = classes.len();
        let flat: Vec<f64> = coefficients.into_iter().flatten().collect();
        let coefficients = Array2::from_shape_vec((n_classes, FEATURE_COUNT), flat)
            .map_err(|e| e.to_string())?;

        Ok(LogisticModel {
            classes,
            coefficients,
            intercepts: Array1::from(intercepts),
        })
    }

    /// Softmax over the per-class scores. Fails when a score overflows.
    pub fn predict_probabilities(&self, features: &FeatureVector) -> Result<Array1<f64>> {
        let scores = self.coefficients.dot(&features.to_row()) + &self.intercepts;
        if let Some(idx) = scores.iter().position(|s| !s.is_finite()) {
            return Err(DashboardError::Prediction(format!(
                "score for class {} is not finite",
                self.classes[idx]
            )));
        }

        let max = scores.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let exp = scores.mapv(|s| (s - max).exp());
        let total = exp.sum();
        Ok(exp / total)
    }
}

impl GradeClassifier for LogisticModel {
    fn predict(&self, features: &FeatureVector) -> Result<GradePrediction> {
        let probabilities = self.predict_probabilities(features)?;
        let (idx, confidence) = argmax(probabilities.iter().copied());
        Ok(GradePrediction {
            grade: self.classes[idx],
            confidence: Some(confidence),
        })
    }

    fn kind(&self) -> &'static str {
        "logistic"
    }

    fn classes(&self) -> &[Grade] {
        &self.classes
    }
}

// Tree ensemble

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Children must point forward so traversal always terminates.
    fn check(&self, n_classes: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, left, right, .. } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!("node {} splits on unknown feature {}", idx, feature));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", idx, child));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {} has {} class weights, expected {}",
                            idx,
                            value.len(),
                            n_classes
                        ));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(format!("leaf {} has a negative or non-finite weight", idx));
                    }
                    if !value.iter().sum::<f64>().is_finite() {
                        return Err(format!("leaf {} weights overflow when summed", idx));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_for(&self, x: &[f64; FEATURE_COUNT]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split { feature, threshold, left, right } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForestModel {
    classes: Vec<Grade>,
    trees: Vec<DecisionTree>,
}

impl ForestModel {
    pub fn new(classes: Vec<Grade>, trees: Vec<DecisionTree>) -> std::result::Result<Self, String> {
        if classes.is_empty() {
            return Err("classifier has no classes".to_string());
        }
        if trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (idx, tree) in trees.iter().enumerate() {
            tree.check(classes.len()).map_err(|e| format!("tree {}: {}", idx, e))?;
        }
        Ok(ForestModel { classes, trees })
    }

    /// Mean of the per-tree normalized leaf distributions.
    pub fn predict_probabilities(&self, features: &FeatureVector) -> Array1<f64> {
        let x = features.to_array();
        let mut acc = Array1::<f64>::zeros(self.classes.len());

        for tree in &self.trees {
            let leaf = Array1::from(tree.leaf_for(&x).to_vec());
            let total = leaf.sum();
            if total > 0.0 {
                acc += &(leaf / total);
            }
        }

        acc / self.trees.len() as f64
    }
}

impl GradeClassifier for ForestModel {
    fn predict(&self, features: &FeatureVector) -> Result<GradePrediction> {
        let probabilities = self.predict_probabilities(features);
        let (idx, confidence) = argmax(probabilities.iter().copied());
        Ok(GradePrediction {
            grade: self.classes[idx],
            confidence: Some(confidence),
        })
    }

    fn kind(&self) -> &'static str {
        "forest"
    }

    fn classes(&self) -> &[Grade] {
        &self.classes
    }
}

/// First index wins on ties.
fn argmax(values: impl Iterator<Item = f64>) -> (usize, f64) {
    values
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (idx, v)| if v > best.1 { (idx, v) } else { best })
}

// Artifact loading

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ClassifierArtifact {
    Logistic {
        classes: Vec<Grade>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
    Forest {
        classes: Vec<Grade>,
        trees: Vec<DecisionTree>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
}

fn check_feature_names(names: Option<&[String]>) -> std::result::Result<(), String> {
    match names {
        Some(names) if !names.iter().map(String::as_str).eq(FEATURE_NAMES) => Err(format!(
            "feature order {:?} does not match {:?}",
            names, FEATURE_NAMES
        )),
        _ => Ok(()),
    }
}

/// Read an artifact file; any failure makes the artifacts unavailable.
pub(crate) fn read_artifact(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DashboardError::ArtifactMissing {
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        },
        _ => DashboardError::invalid_artifact(path, e.to_string()),
    })
}

pub fn load_classifier(path: &Path) -> Result<Arc<dyn GradeClassifier>> {
    let text = read_artifact(path)?;
    let artifact: ClassifierArtifact = serde_json::from_str(&text)
        .map_err(|e| DashboardError::invalid_artifact(path, e.to_string()))?;

    let classifier: std::result::Result<Arc<dyn GradeClassifier>, String> = match artifact {
        ClassifierArtifact::Logistic { classes, coefficients, intercepts, feature_names } => {
            check_feature_names(feature_names.as_deref())
                .and_then(|_| LogisticModel::new(classes, coefficients, intercepts))
                .map(|m| Arc::new(m) as Arc<dyn GradeClassifier>)
        }
        ClassifierArtifact::Forest { classes, trees, feature_names } => {
            check_feature_names(feature_names.as_deref())
                .and_then(|_| ForestModel::new(classes, trees))
                .map(|m| Arc::new(m) as Arc<dyn GradeClassifier>)
        }
    };

    classifier.map_err(|reason| DashboardError::invalid_artifact(path, reason))
}

/// A loaded classifier together with its encoders.
#[derive(Clone)]
pub struct ModelArtifacts {
    pub classifier: Arc<dyn GradeClassifier>,
    pub encoders: Arc<dyn CategoricalEncoder>,
    /// Fitted categories, when the encoders came from a file.
    pub encoder_set: Option<EncoderSet>,
}

impl ModelArtifacts {
    pub fn new(classifier: Arc<dyn GradeClassifier>, encoders: Arc<dyn CategoricalEncoder>) -> Self {
        ModelArtifacts {
            classifier,
            encoders,
            encoder_set: None,
        }
    }
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("classifier", &self.classifier.kind())
            .field("classes", &self.classifier.classes())
            .finish()
    }
}

pub fn load_model_components(dir: &Path) -> Result<ModelArtifacts> {
    let model_path = dir.join(MODEL_FILE);
    let encoders_path = dir.join(ENCODERS_FILE);

    if !model_path.is_file() || !encoders_path.is_file() {
        return Err(DashboardError::ArtifactMissing { dir: dir.to_path_buf() });
    }

    let classifier = load_classifier(&model_path)?;
    let encoder_set = EncoderSet::load(&encoders_path)?;

    Ok(ModelArtifacts {
        classifier,
        encoders: Arc::new(encoder_set.clone()),
        encoder_set: Some(encoder_set),
    })
}

// Process-wide cache

/// Caches the loaded artifacts; retries the load while they are unavailable.
pub struct ModelStore {
    dir: Option<PathBuf>,
    loaded: RwLock<Option<Arc<ModelArtifacts>>>,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ModelStore {
            dir: Some(dir.into()),
            loaded: RwLock::new(None),
        }
    }

    /// A store that never touches disk.
    pub fn with_artifacts(artifacts: ModelArtifacts) -> Self {
        ModelStore {
            dir: None,
            loaded: RwLock::new(Some(Arc::new(artifacts))),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.read().is_some()
    }

    pub fn get(&self) -> Result<Arc<ModelArtifacts>> {
        if let Some(artifacts) = self.loaded.read().as_ref() {
            return Ok(Arc::clone(artifacts));
        }

        let dir = self
            .dir
            .as_deref()
            .ok_or_else(|| DashboardError::ArtifactMissing { dir: PathBuf::new() })?;

        let mut slot = self.loaded.write();
        // Another request may have loaded while we waited for the lock.
        if let Some(artifacts) = slot.as_ref() {
            return Ok(Arc::clone(artifacts));
        }

        match load_model_components(dir) {
            Ok(artifacts) => {
                tracing::info!(
                    "loaded {} classifier with classes {:?} from {}",
                    artifacts.classifier.kind(),
                    artifacts.classifier.classes(),
                    dir.display()
                );
                let artifacts = Arc::new(artifacts);
                *slot = Some(Arc::clone(&artifacts));
                Ok(artifacts)
            }
            Err(e) => {
                tracing::warn!("model artifacts unavailable: {}", e);
                Err(e)
            }
        }
    }
}
