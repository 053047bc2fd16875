//! safetensors weight loading and lazily built models.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use once_cell::sync::OnceCell;
use safetensors::SafeTensors;
use tracing::{debug, info};

/// A model built from a weights file on first use.
///
/// The outcome of the first load is cached, including failure, so a missing
/// or corrupt file is reported once instead of on every frame.
pub struct LazyModel<T> {
    path: PathBuf,
    device: Device,
    build: fn(VarBuilder) -> Result<T>,
    model: OnceCell<Result<T, String>>,
}

impl<T: Send + Sync> LazyModel<T> {
    /// Creates a loader for `path`; nothing is read until [`LazyModel::get`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, device: Device, build: fn(VarBuilder) -> Result<T>) -> Self {
        Self {
            path: path.into(),
            device,
            build,
            model: OnceCell::new(),
        }
    }

    /// Path of the weights file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the model, loading it on the first call.
    ///
    /// # Errors
    ///
    /// Returns the (cached) load error if the file cannot be read, is not
    /// valid safetensors, or lacks the weights the model needs.
    pub fn get(&self) -> Result<&T> {
        self.model
            .get_or_init(|| {
                let loaded = load_safetensors(&self.path, &self.device).and_then(self.build);
                match &loaded {
                    Ok(_) => info!("loaded model {}", self.path.display()),
                    Err(e) => debug!("model {} failed to load: {e:#}", self.path.display()),
                }
                loaded.map_err(|e| format!("{e:#}"))
            })
            .as_ref()
            .map_err(|e| anyhow::anyhow!("{e}"))
    }

    /// True once a load has been attempted and succeeded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self.model.get(), Some(Ok(_)))
    }
}

/// Reads a safetensors file into a [`VarBuilder`] on `device`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds an unsupported dtype.
pub fn load_safetensors(path: impl AsRef<Path>, device: &Device) -> Result<VarBuilder<'static>> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read weights {}", path.display()))?;
    let st = SafeTensors::deserialize(&bytes)
        .with_context(|| format!("invalid safetensors file {}", path.display()))?;

    let tensors = st
        .tensors()
        .into_iter()
        .map(|(name, view)| {
            let dtype = candle_dtype(view.dtype())
                .with_context(|| format!("tensor '{name}' in {}", path.display()))?;
            let tensor = Tensor::from_raw_buffer(view.data(), dtype, view.shape(), device)
                .with_context(|| format!("failed to materialize tensor '{name}'"))?;
            Ok((name, tensor))
        })
        .collect::<Result<HashMap<_, _>>>()?;

    debug!(tensors = tensors.len(), "read {}", path.display());
    Ok(VarBuilder::from_tensors(tensors, DType::F32, device))
}

fn candle_dtype(dtype: safetensors::Dtype) -> Result<DType> {
    use safetensors::Dtype as S;
    Ok(match dtype {
        S::F32 => DType::F32,
        S::F64 => DType::F64,
        S::F16 => DType::F16,
        S::BF16 => DType::BF16,
        S::I64 => DType::I64,
        S::U32 => DType::U32,
        S::U8 => DType::U8,
        other => anyhow::bail!("unsupported dtype {other:?}"),
    })
}
