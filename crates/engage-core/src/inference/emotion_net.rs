//! Seven-way facial expression CNN.
//!
//! Input is a 48x48 grayscale frame scaled to `[0,1]`; output is a
//! probability per [`EmotionLabel::ALL`] entry, in that order.

#![allow(clippy::cast_possible_truncation)]

use anyhow::{Context, Result};
use candle_core::{Device, Module, Tensor};
use candle_nn::{conv2d, linear, Conv2d, Conv2dConfig, Linear, VarBuilder};

use super::utils::{argmax, softmax};
use crate::domain::EmotionLabel;

/// Network input edge, in pixels.
pub const INPUT_SIZE: usize = 48;

/// Channel widths of the three conv stages.
const CHANNELS: [usize; 4] = [1, 32, 64, 128];

/// Spatial size after three 2x2 pools.
const FEATURE_SIZE: usize = INPUT_SIZE / 8;

const HIDDEN: usize = 256;

/// The expression classifier network.
pub struct EmotionNet {
    convs: Vec<Conv2d>,
    fc1: Linear,
    fc2: Linear,
    device: Device,
}

impl EmotionNet {
    /// Builds the network from `vb` (`conv1..conv3`, `fc1`, `fc2`).
    ///
    /// # Errors
    ///
    /// Returns an error if any expected weight is missing or misshaped.
    #[allow(clippy::needless_pass_by_value)]
    pub fn load(vb: VarBuilder) -> Result<Self> {
        let padded = Conv2dConfig {
            padding: 1,
            ..Conv2dConfig::default()
        };
        let convs = CHANNELS
            .windows(2)
            .enumerate()
            .map(|(i, io)| conv2d(io[0], io[1], 3, padded, vb.pp(format!("conv{}", i + 1))))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let flat = CHANNELS[3] * FEATURE_SIZE * FEATURE_SIZE;
        Ok(Self {
            convs,
            fc1: linear(flat, HIDDEN, vb.pp("fc1"))?,
            fc2: linear(HIDDEN, EmotionLabel::ALL.len(), vb.pp("fc2"))?,
            device: vb.device().clone(),
        })
    }

    /// Converts `image` into a `(1, 1, 48, 48)` input tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor cannot be created on the model's device.
    pub fn preprocess(&self, image: &image::DynamicImage) -> Result<Tensor> {
        let side = INPUT_SIZE as u32;
        let gray = image
            .resize_exact(side, side, image::imageops::FilterType::Triangle)
            .to_luma8();
        let data: Vec<f32> = gray.into_raw().into_iter().map(|v| f32::from(v) / 255.0).collect();
        Tensor::from_vec(data, (1, 1, INPUT_SIZE, INPUT_SIZE), &self.device)
            .context("failed to build classifier input")
    }

    /// Returns the class probabilities for `image`.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    pub fn probabilities(&self, image: &image::DynamicImage) -> Result<Vec<f32>> {
        let input = self.preprocess(image)?;
        let logits = self.forward(&input)?.flatten_all()?.to_vec1::<f32>()?;
        Ok(softmax(&logits))
    }

    /// Returns the most probable label and its probability.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or the output is empty.
    pub fn predict(&self, image: &image::DynamicImage) -> Result<(EmotionLabel, f32)> {
        let probs = self.probabilities(image)?;
        let best = argmax(&probs).context("classifier produced no output")?;
        let label = EmotionLabel::ALL
            .get(best)
            .copied()
            .context("classifier output index out of range")?;
        Ok((label, probs[best]))
    }
}

impl Module for EmotionNet {
    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        let mut x = x.clone();
        for conv in &self.convs {
            x = conv.forward(&x)?.relu()?.max_pool2d(2)?;
        }
        let x = self.fc1.forward(&x.flatten_from(1)?)?.relu()?;
        self.fc2.forward(&x)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use candle_core::DType;

    use super::*;

    /// Zero weights except for a bias that favors `favored`.
    fn net_favoring(favored: usize) -> EmotionNet {
        let dev = Device::Cpu;
        let mut tensors = HashMap::new();
        for (i, io) in CHANNELS.windows(2).enumerate() {
            let name = format!("conv{}", i + 1);
            tensors.insert(
                format!("{name}.weight"),
                Tensor::zeros((io[1], io[0], 3, 3), DType::F32, &dev).unwrap(),
            );
            tensors.insert(
                format!("{name}.bias"),
                Tensor::zeros(io[1], DType::F32, &dev).unwrap(),
            );
        }
        let flat = CHANNELS[3] * FEATURE_SIZE * FEATURE_SIZE;
        tensors.insert(
            "fc1.weight".into(),
            Tensor::zeros((HIDDEN, flat), DType::F32, &dev).unwrap(),
        );
        tensors.insert("fc1.bias".into(), Tensor::zeros(HIDDEN, DType::F32, &dev).unwrap());
        tensors.insert(
            "fc2.weight".into(),
            Tensor::zeros((7, HIDDEN), DType::F32, &dev).unwrap(),
        );
        let mut bias = vec![0.0f32; 7];
        bias[favored] = 3.0;
        tensors.insert("fc2.bias".into(), Tensor::from_vec(bias, 7, &dev).unwrap());
        EmotionNet::load(VarBuilder::from_tensors(tensors, DType::F32, &dev)).unwrap()
    }

    #[test]
    fn test_feature_size() {
        assert_eq!(FEATURE_SIZE, 6);
    }

    #[test]
    fn test_predict_follows_output_bias() {
        let net = net_favoring(3);
        let image = image::DynamicImage::new_rgb8(100, 80);
        let (label, p) = net.predict(&image).unwrap();
        assert_eq!(label, EmotionLabel::Happy);
        assert!(p > 0.5);
        let probs = net.probabilities(&image).unwrap();
        assert_eq!(probs.len(), 7);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_missing_weights_fail_to_load() {
        let vb = VarBuilder::from_tensors(HashMap::new(), DType::F32, &Device::Cpu);
        assert!(EmotionNet::load(vb).is_err());
    }
}
