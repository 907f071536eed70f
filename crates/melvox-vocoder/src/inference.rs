//! ONNX inference engine abstraction
//!
//! Thin wrapper over tract (pure Rust) for running the vocoder graph on
//! CPU. Provider detection reports what the host could accelerate with;
//! execution stays on the tract backend either way.

use crate::error::{VocoderError, VocoderResult};
use std::path::Path;

/// Execution provider for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionProvider {
    /// CPU execution using Tract (pure Rust)
    Cpu,
    /// NVIDIA CUDA (detected but not yet wired to a GPU backend)
    Cuda,
}

impl ExecutionProvider {
    /// Check if this provider is available on the current system
    pub fn is_available(&self) -> bool {
        match self {
            ExecutionProvider::Cpu => true,
            ExecutionProvider::Cuda => {
                std::env::var("CUDA_PATH").is_ok()
                    || Path::new("/usr/local/cuda").exists()
            }
        }
    }

    /// Get priority (higher = preferred)
    pub fn priority(&self) -> u32 {
        match self {
            ExecutionProvider::Cuda => 90,
            ExecutionProvider::Cpu => 10,
        }
    }
}

/// Auto-detect best execution provider
pub fn detect_best_provider() -> ExecutionProvider {
    [ExecutionProvider::Cuda, ExecutionProvider::Cpu]
        .into_iter()
        .filter(|p| p.is_available())
        .max_by_key(|p| p.priority())
        .unwrap_or(ExecutionProvider::Cpu)
}

/// Configuration for the inference engine
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Number of threads for CPU execution
    pub num_threads: usize,
    /// Enable graph optimization on load
    pub optimize_graph: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            optimize_graph: true,
        }
    }
}

/// Tract model wrapper
struct TractModel {
    model: tract_onnx::prelude::SimplePlan<
        tract_onnx::prelude::TypedFact,
        Box<dyn tract_onnx::prelude::TypedOp>,
        tract_onnx::prelude::Graph<
            tract_onnx::prelude::TypedFact,
            Box<dyn tract_onnx::prelude::TypedOp>,
        >,
    >,
}

/// Unified inference engine
pub struct InferenceEngine {
    /// Detected execution provider (informational)
    provider: ExecutionProvider,
    /// Tract model
    tract_model: TractModel,
    /// Configuration
    #[allow(dead_code)]
    config: InferenceConfig,
}

impl InferenceEngine {
    /// Create a new inference engine from an ONNX file
    pub fn new<P: AsRef<Path>>(model_path: P, config: InferenceConfig) -> VocoderResult<Self> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(VocoderError::ModelNotFound {
                path: path.display().to_string(),
            });
        }

        let provider = detect_best_provider();
        log::info!(
            "Using execution provider: {:?} for model {}",
            provider,
            path.display()
        );

        let model = Self::load_tract_model(path, config.optimize_graph)?;

        Ok(Self {
            provider,
            tract_model: model,
            config,
        })
    }

    /// Load tract model
    fn load_tract_model(path: &Path, optimize: bool) -> VocoderResult<TractModel> {
        use tract_onnx::prelude::*;

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| VocoderError::ModelLoadFailed { reason: e.to_string() })?;

        let model = if optimize {
            model
                .into_optimized()
                .map_err(|e| VocoderError::ModelLoadFailed { reason: e.to_string() })?
        } else {
            model
                .into_typed()
                .map_err(|e| VocoderError::ModelLoadFailed { reason: e.to_string() })?
        };

        let model = model
            .into_runnable()
            .map_err(|e| VocoderError::ModelLoadFailed { reason: e.to_string() })?;

        Ok(TractModel { model })
    }

    /// Run inference with f32 inputs/outputs
    pub fn run_f32(
        &self,
        inputs: &[ndarray::ArrayD<f32>],
    ) -> VocoderResult<Vec<ndarray::ArrayD<f32>>> {
        use tract_onnx::prelude::*;

        let tract_inputs: TVec<TValue> = inputs
            .iter()
            .map(|arr| {
                let tensor: Tensor = arr.clone().into();
                tensor.into()
            })
            .collect();

        let outputs = self
            .tract_model
            .model
            .run(tract_inputs)
            .map_err(|e| VocoderError::TractError(e.to_string()))?;

        let mut result = Vec::new();
        for output in outputs.iter() {
            let tensor = output
                .to_array_view::<f32>()
                .map_err(|e| VocoderError::TractError(e.to_string()))?;
            result.push(tensor.to_owned().into_dyn());
        }

        Ok(result)
    }

    /// Run the mel → waveform graph for one fold
    ///
    /// Input: `[1, num_mels, frames]`. Returns the flattened waveform from
    /// the first model output.
    pub fn run_mel(&self, mel: &ndarray::Array3<f32>) -> VocoderResult<Vec<f32>> {
        let outputs = self.run_f32(&[mel.clone().into_dyn()])?;

        let output = outputs.into_iter().next().ok_or_else(|| {
            VocoderError::InferenceFailed {
                reason: "No output from model".into(),
            }
        })?;

        Ok(output.into_iter().collect())
    }

    /// Detected execution provider
    pub fn provider(&self) -> ExecutionProvider {
        self.provider
    }
}
