//! Whole-frame hand landmark regressor.
//!
//! Input is a 128x128 RGB frame scaled to `[0,1]`. The network predicts a
//! hand presence logit and 21 `(x, y, z)` points in normalized image
//! coordinates, so at most one hand is reported per frame.

#![allow(clippy::cast_possible_truncation)]

use anyhow::{Context, Result};
use candle_core::{Device, Module, Tensor};
use candle_nn::{conv2d, linear, Conv2d, Conv2dConfig, Linear, VarBuilder};

use super::utils::sigmoid;
use crate::domain::{hand_index, LandmarkPoint, LandmarkSet};

/// Network input edge, in pixels.
pub const INPUT_SIZE: usize = 128;

const CHANNELS: [usize; 5] = [3, 16, 32, 64, 128];

/// Spatial size after four 2x2 pools.
const FEATURE_SIZE: usize = INPUT_SIZE / 16;

const HIDDEN: usize = 256;

const OUTPUTS: usize = hand_index::REQUIRED_POINTS * 3;

/// The hand landmark network.
pub struct HandNet {
    convs: Vec<Conv2d>,
    fc: Linear,
    presence: Linear,
    landmarks: Linear,
    device: Device,
}

impl HandNet {
    /// Builds the network from `vb` (`conv1..conv4`, `fc`, `presence`, `landmarks`).
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
        let flat = CHANNELS[4] * FEATURE_SIZE * FEATURE_SIZE;
        Ok(Self {
            convs,
            fc: linear(flat, HIDDEN, vb.pp("fc"))?,
            presence: linear(HIDDEN, 1, vb.pp("presence"))?,
            landmarks: linear(HIDDEN, OUTPUTS, vb.pp("landmarks"))?,
            device: vb.device().clone(),
        })
    }

    /// Converts `image` into a `(1, 3, 128, 128)` input tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor cannot be created on the model's device.
    pub fn preprocess(&self, image: &image::DynamicImage) -> Result<Tensor> {
        let side = INPUT_SIZE as u32;
        let rgb = image
            .resize_exact(side, side, image::imageops::FilterType::Triangle)
            .to_rgb8();
        let data: Vec<f32> = rgb.into_raw().into_iter().map(|v| f32::from(v) / 255.0).collect();
        Tensor::from_vec(data, (1, INPUT_SIZE, INPUT_SIZE, 3), &self.device)?
            .permute((0, 3, 1, 2))?
            .contiguous()
            .context("failed to build hand model input")
    }

    /// Returns the hand in `image` if its presence score reaches `min_presence`.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    pub fn detect(&self, image: &image::DynamicImage, min_presence: f32) -> Result<Option<LandmarkSet>> {
        let input = self.preprocess(image)?;
        let features = self.features(&input)?;
        let logit = self
            .presence
            .forward(&features)?
            .flatten_all()?
            .to_vec1::<f32>()?
            .first()
            .copied()
            .context("hand model produced no presence score")?;
        if sigmoid(logit) < min_presence {
            return Ok(None);
        }
        let coords = self.landmarks.forward(&features)?.flatten_all()?.to_vec1::<f32>()?;
        let points = coords
            .chunks_exact(3)
            .map(|c| LandmarkPoint {
                x: sigmoid(c[0]),
                y: sigmoid(c[1]),
                z: c[2],
            })
            .collect();
        Ok(Some(LandmarkSet::new(points)))
    }

    fn features(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        let mut x = x.clone();
        for conv in &self.convs {
            x = conv.forward(&x)?.relu()?.max_pool2d(2)?;
        }
        self.fc.forward(&x.flatten_from(1)?)?.relu()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use candle_core::DType;

    use super::*;

    /// Zero weights, with biases setting the presence logit and the first
    /// point's x/y logits.
    fn net(presence: f32, x_logit: f32) -> HandNet {
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
        let flat = CHANNELS[4] * FEATURE_SIZE * FEATURE_SIZE;
        tensors.insert(
            "fc.weight".into(),
            Tensor::zeros((HIDDEN, flat), DType::F32, &dev).unwrap(),
        );
        tensors.insert("fc.bias".into(), Tensor::zeros(HIDDEN, DType::F32, &dev).unwrap());
        tensors.insert(
            "presence.weight".into(),
            Tensor::zeros((1, HIDDEN), DType::F32, &dev).unwrap(),
        );
        tensors.insert(
            "presence.bias".into(),
            Tensor::from_vec(vec![presence], 1, &dev).unwrap(),
        );
        tensors.insert(
            "landmarks.weight".into(),
            Tensor::zeros((OUTPUTS, HIDDEN), DType::F32, &dev).unwrap(),
        );
        let mut bias = vec![0.0f32; OUTPUTS];
        bias[0] = x_logit;
        tensors.insert(
            "landmarks.bias".into(),
            Tensor::from_vec(bias, OUTPUTS, &dev).unwrap(),
        );
        HandNet::load(VarBuilder::from_tensors(tensors, DType::F32, &dev)).unwrap()
    }

    #[test]
    fn test_feature_size() {
        assert_eq!(FEATURE_SIZE, 8);
    }

    #[test]
    fn test_present_hand_yields_full_schema() {
        let image = image::DynamicImage::new_rgb8(64, 48);
        let hand = net(4.0, 10.0).detect(&image, 0.5).unwrap().unwrap();
        assert_eq!(hand.len(), hand_index::REQUIRED_POINTS);
        assert!(hand.get(0).unwrap().x > 0.99);
        let second = hand.get(1).unwrap();
        assert!((second.x - 0.5).abs() < 1e-6);
        assert!((second.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_low_presence_yields_nothing() {
        let image = image::DynamicImage::new_rgb8(64, 48);
        assert!(net(-4.0, 0.0).detect(&image, 0.5).unwrap().is_none());
    }

    #[test]
    fn test_missing_weights_fail_to_load() {
        let vb = VarBuilder::from_tensors(HashMap::new(), DType::F32, &Device::Cpu);
        assert!(HandNet::load(vb).is_err());
    }
}
