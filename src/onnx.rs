//! `Classifier` backed by an ONNX graph executed with tract.
//!
//! The graph takes one `f32` tensor of shape `[1, 7]`. Output 0 carries the
//! label (string, integer, or per-class scores); output 1, when present, is the
//! probability row. Class names live in a JSON array next to the model.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tract_core::prelude::{DatumType, Tensor};
use tract_onnx::prelude::*;

use crate::features::{FeatureVector, FEATURE_COUNT};
use crate::inference::{Classifier, InferenceError};

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to load model {path}: {message}")]
    Graph { path: PathBuf, message: String },

    #[error("failed to read class labels {path}: {message}")]
    Labels { path: PathBuf, message: String },

    #[error("model has a probability output but no class labels were found at {0}")]
    MissingLabels(PathBuf),
}

pub struct OnnxClassifier {
    plan: Plan,
    classes: Vec<String>,
    has_proba: bool,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path, labels_path: &Path) -> Result<Self, ModelLoadError> {
        let graph_err = |e: anyhow::Error| ModelLoadError::Graph {
            path: model_path.to_path_buf(),
            message: format!("{:#}", e),
        };

        let plan = tract_onnx::onnx()
            .model_for_path(model_path)
            .map_err(graph_err)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, FEATURE_COUNT)),
            )
            .map_err(graph_err)?
            .into_optimized()
            .map_err(graph_err)?
            .into_runnable()
            .map_err(graph_err)?;

        let has_proba = plan.model().outputs.len() > 1;
        let classes = match load_labels(labels_path)? {
            Some(classes) => classes,
            None if has_proba => {
                return Err(ModelLoadError::MissingLabels(labels_path.to_path_buf()))
            }
            None => Vec::new(),
        };

        log::info!(
            "Loaded model {} ({} classes, probabilities: {})",
            model_path.display(),
            classes.len(),
            has_proba
        );

        Ok(Self {
            plan,
            classes,
            has_proba,
        })
    }

    fn run(&self, features: &FeatureVector) -> Result<TVec<TValue>, InferenceError> {
        let input: Tensor =
            tract_ndarray::Array2::from_shape_vec((1, FEATURE_COUNT), features.to_f32())
                .map_err(|e| InferenceError::new(format!("bad input shape: {}", e)))?
                .into();

        self.plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::new(format!("model execution failed: {:#}", e)))
    }
}

impl Classifier for OnnxClassifier {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, features: &FeatureVector) -> Result<String, InferenceError> {
        self.predict_with_proba(features).map(|(label, _)| label)
    }

    fn predict_proba(
        &self,
        features: &FeatureVector,
    ) -> Result<Option<Vec<f32>>, InferenceError> {
        self.predict_with_proba(features).map(|(_, probs)| probs)
    }

    fn predict_with_proba(
        &self,
        features: &FeatureVector,
    ) -> Result<(String, Option<Vec<f32>>), InferenceError> {
        let outputs = self.run(features)?;
        let first = outputs
            .first()
            .ok_or_else(|| InferenceError::new("model produced no outputs"))?;
        let label = label_from_output(first, &self.classes)?;

        if !self.has_proba {
            return Ok((label, None));
        }
        let second = outputs
            .get(1)
            .ok_or_else(|| InferenceError::new("model produced no probability output"))?;
        let probs = probabilities_from_output(second)?;
        Ok((label, Some(probs)))
    }
}

/// Reads the class labels file. A missing file is not an error.
pub fn load_labels(path: &Path) -> Result<Option<Vec<String>>, ModelLoadError> {
    let labels_err = |message: String| ModelLoadError::Labels {
        path: path.to_path_buf(),
        message,
    };

    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| labels_err(e.to_string()))?;
    let classes: Vec<String> = serde_json::from_str(&raw).map_err(|e| labels_err(e.to_string()))?;
    if classes.is_empty() {
        return Err(labels_err("label list is empty".to_string()));
    }
    Ok(Some(classes))
}

fn tract_err(e: anyhow::Error) -> InferenceError {
    InferenceError::new(format!("unexpected model output: {:#}", e))
}

pub(crate) fn label_from_output(
    output: &Tensor,
    classes: &[String],
) -> Result<String, InferenceError> {
    let empty = || InferenceError::new("model returned an empty label output");
    match output.datum_type() {
        DatumType::String => output
            .as_slice::<String>()
            .map_err(tract_err)?
            .first()
            .cloned()
            .ok_or_else(empty),
        DatumType::I64 => output
            .as_slice::<i64>()
            .map_err(tract_err)?
            .first()
            .map(|v| v.to_string())
            .ok_or_else(empty),
        DatumType::F32 => {
            let scores = output.as_slice::<f32>().map_err(tract_err)?;
            let (idx, _) = scores
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
                .ok_or_else(empty)?;
            classes.get(idx).cloned().ok_or_else(|| {
                InferenceError::new(format!(
                    "score index {} has no class label ({} labels loaded)",
                    idx,
                    classes.len()
                ))
            })
        }
        other => Err(InferenceError::new(format!(
            "unsupported label output type {:?}",
            other
        ))),
    }
}

pub(crate) fn probabilities_from_output(output: &Tensor) -> Result<Vec<f32>, InferenceError> {
    match output.datum_type() {
        DatumType::F32 => Ok(output.as_slice::<f32>().map_err(tract_err)?.to_vec()),
        DatumType::F64 => Ok(output
            .as_slice::<f64>()
            .map_err(tract_err)?
            .iter()
            .map(|p| *p as f32)
            .collect()),
        other => Err(InferenceError::new(format!(
            "unsupported probability output type {:?}",
            other
        ))),
    }
}
