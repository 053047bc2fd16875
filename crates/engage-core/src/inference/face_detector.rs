//! BlazeFace short-range face detector.
//!
//! Network layout and weight names follow the hollance/BlazeFace-PyTorch
//! port with batch norm folded into the convolution biases. Detections carry
//! six keypoints which [`FaceBox::to_landmarks`] spreads onto the sparse
//! subset of the face-mesh schema the analyzers read.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use anyhow::{Context, Result};
use candle_core::{Device, Module, Tensor};
use candle_nn::{conv2d, Conv2d, Conv2dConfig, VarBuilder};

use super::utils::sigmoid;
use crate::domain::{face_index, LandmarkPoint, LandmarkSet};

/// Network input edge, in pixels.
pub const INPUT_SIZE: usize = 128;

/// `(grid, anchors per cell)` for the two detection heads.
const HEADS: [(usize, usize); 2] = [(16, 2), (8, 6)];

const NUM_ANCHORS: usize = HEADS[0].0 * HEADS[0].0 * HEADS[0].1 + HEADS[1].0 * HEADS[1].0 * HEADS[1].1;

/// Regressor values per anchor: 4 box + 6 keypoints * 2.
const BOX_VALUES: usize = 16;

/// Overlap above which detections are merged.
const MERGE_IOU: f32 = 0.3;

/// Raw logits are clipped to this magnitude before the sigmoid.
const SCORE_CLIP: f32 = 100.0;

/// `(in, out, stride)` for each block of the 16x16 backbone.
const BACKBONE_16: [(usize, usize, usize); 11] = [
    (24, 24, 1),
    (24, 28, 1),
    (28, 32, 2),
    (32, 36, 1),
    (36, 42, 1),
    (42, 48, 2),
    (48, 56, 1),
    (56, 64, 1),
    (64, 72, 1),
    (72, 80, 1),
    (80, 88, 1),
];

/// `(in, out, stride)` for each block of the 8x8 backbone.
const BACKBONE_8: [(usize, usize, usize); 5] = [
    (88, 96, 2),
    (96, 96, 1),
    (96, 96, 1),
    (96, 96, 1),
    (96, 96, 1),
];

/// Keypoint slots in a detection.
mod keypoint {
    pub const RIGHT_EYE: usize = 0;
    pub const LEFT_EYE: usize = 1;
    pub const NOSE: usize = 2;
    pub const MOUTH: usize = 3;
    pub const RIGHT_EAR: usize = 4;
    pub const LEFT_EAR: usize = 5;
}

/// One detected face in normalized image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceBox {
    /// `[x_min, y_min, x_max, y_max]`.
    pub bbox: [f32; 4],
    /// Detection confidence in `[0,1]`.
    pub score: f32,
    /// Subject's right eye, left eye, nose, mouth, right ear, left ear.
    pub keypoints: [[f32; 2]; 6],
}

impl FaceBox {
    fn keypoint(&self, slot: usize) -> LandmarkPoint {
        let [x, y] = self.keypoints[slot];
        LandmarkPoint::new(x, y)
    }

    /// Expands the six keypoints into a face-mesh sized landmark set.
    ///
    /// Only the indices the analyzers read are placed; every other slot holds
    /// the box center. Forehead and chin are extrapolated along the
    /// eye-to-mouth axis.
    #[must_use]
    pub fn to_landmarks(&self) -> LandmarkSet {
        let subject_right_eye = self.keypoint(keypoint::RIGHT_EYE);
        let subject_left_eye = self.keypoint(keypoint::LEFT_EYE);
        let mouth = self.keypoint(keypoint::MOUTH);
        let eye_mid = LandmarkPoint::new(
            (subject_right_eye.x + subject_left_eye.x) / 2.0,
            (subject_right_eye.y + subject_left_eye.y) / 2.0,
        );
        let along = |t: f32| {
            LandmarkPoint::new(
                t.mul_add(mouth.x - eye_mid.x, eye_mid.x).clamp(0.0, 1.0),
                t.mul_add(mouth.y - eye_mid.y, eye_mid.y).clamp(0.0, 1.0),
            )
        };

        let center = LandmarkPoint::new(
            (self.bbox[0] + self.bbox[2]) / 2.0,
            (self.bbox[1] + self.bbox[3]) / 2.0,
        );
        let mut points = vec![center; face_index::MESH_POINTS];
        // Mesh "left" indices sit on the image-left side, i.e. the subject's right.
        points[face_index::LEFT_EYE] = subject_right_eye;
        points[face_index::RIGHT_EYE] = subject_left_eye;
        points[face_index::LEFT_CHEEK] = self.keypoint(keypoint::RIGHT_EAR);
        points[face_index::RIGHT_CHEEK] = self.keypoint(keypoint::LEFT_EAR);
        points[face_index::NOSE_TIP] = self.keypoint(keypoint::NOSE);
        points[face_index::UPPER_LIP] = mouth;
        points[face_index::FOREHEAD] = along(-0.45);
        points[face_index::CHIN] = along(1.75);
        LandmarkSet::new(points)
    }
}

/// Depthwise-separable residual block.
struct BlazeBlock {
    depthwise: Conv2d,
    pointwise: Conv2d,
    stride: usize,
    extra_channels: usize,
}

impl BlazeBlock {
    fn load(in_ch: usize, out_ch: usize, stride: usize, vb: &VarBuilder) -> Result<Self> {
        let depthwise = conv2d(
            in_ch,
            in_ch,
            3,
            Conv2dConfig {
                stride,
                padding: usize::from(stride == 1),
                groups: in_ch,
                ..Conv2dConfig::default()
            },
            vb.pp("depthwise"),
        )?;
        let pointwise = conv2d(in_ch, out_ch, 1, Conv2dConfig::default(), vb.pp("pointwise"))?;
        Ok(Self {
            depthwise,
            pointwise,
            stride,
            extra_channels: out_ch.saturating_sub(in_ch),
        })
    }
}

impl Module for BlazeBlock {
    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        let (branch_in, mut shortcut) = if self.stride == 2 {
            (
                x.pad_with_zeros(2, 0, 2)?.pad_with_zeros(3, 0, 2)?,
                x.max_pool2d(2)?,
            )
        } else {
            (x.clone(), x.clone())
        };
        let branch = self
            .pointwise
            .forward(&self.depthwise.forward(&branch_in)?.relu()?)?;
        if self.extra_channels > 0 {
            shortcut = shortcut.pad_with_zeros(1, 0, self.extra_channels)?;
        }
        (branch + shortcut)?.relu()
    }
}

/// A detection head: per-cell classifier and box regressor.
struct Head {
    classifier: Conv2d,
    regressor: Conv2d,
    anchors_per_cell: usize,
}

impl Head {
    fn load(channels: usize, anchors_per_cell: usize, name: &str, vb: &VarBuilder) -> Result<Self> {
        Ok(Self {
            classifier: conv2d(
                channels,
                anchors_per_cell,
                1,
                Conv2dConfig::default(),
                vb.pp(format!("classifier_{name}")),
            )?,
            regressor: conv2d(
                channels,
                anchors_per_cell * BOX_VALUES,
                1,
                Conv2dConfig::default(),
                vb.pp(format!("regressor_{name}")),
            )?,
            anchors_per_cell,
        })
    }

    /// Returns `(scores, boxes)` shaped `(cells * anchors, 1)` and `(cells * anchors, 16)`.
    fn forward(&self, features: &Tensor) -> candle_core::Result<(Tensor, Tensor)> {
        let (_, _, h, w) = features.dims4()?;
        let n = h * w * self.anchors_per_cell;
        let scores = self
            .classifier
            .forward(features)?
            .permute((0, 2, 3, 1))?
            .reshape((n, 1))?;
        let boxes = self
            .regressor
            .forward(features)?
            .permute((0, 2, 3, 1))?
            .reshape((n, BOX_VALUES))?;
        Ok((scores, boxes))
    }
}

/// The BlazeFace network plus its anchor grid.
pub struct BlazeFace {
    stem: Conv2d,
    backbone_16: Vec<BlazeBlock>,
    backbone_8: Vec<BlazeBlock>,
    head_16: Head,
    head_8: Head,
    anchors: Vec<[f32; 2]>,
    device: Device,
}

impl BlazeFace {
    /// Builds the network from `vb`.
    ///
    /// # Errors
    ///
    /// Returns an error if any expected weight is missing or misshaped.
    #[allow(clippy::needless_pass_by_value)]
    pub fn load(vb: VarBuilder) -> Result<Self> {
        let stem = conv2d(
            3,
            24,
            5,
            Conv2dConfig {
                stride: 2,
                ..Conv2dConfig::default()
            },
            vb.pp("conv0"),
        )?;
        let blocks = |table: &[(usize, usize, usize)], prefix: &str| {
            table
                .iter()
                .enumerate()
                .map(|(i, &(in_ch, out_ch, stride))| {
                    BlazeBlock::load(in_ch, out_ch, stride, &vb.pp(format!("{prefix}.{i}")))
                })
                .collect::<Result<Vec<_>>>()
        };
        let backbone_16 = blocks(&BACKBONE_16, "backbone1")?;
        let backbone_8 = blocks(&BACKBONE_8, "backbone2")?;

        Ok(Self {
            stem,
            backbone_16,
            backbone_8,
            head_16: Head::load(88, HEADS[0].1, "16", &vb)?,
            head_8: Head::load(96, HEADS[1].1, "8", &vb)?,
            anchors: anchor_centers(),
            device: vb.device().clone(),
        })
    }

    /// Resizes `image` to the network input and scales it to `[-1, 1]`, NCHW.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor cannot be created on the model's device.
    pub fn preprocess(&self, image: &image::DynamicImage) -> Result<Tensor> {
        let side = INPUT_SIZE as u32;
        let rgb = image
            .resize_exact(side, side, image::imageops::FilterType::Triangle)
            .to_rgb8();
        let data: Vec<f32> = rgb
            .into_raw()
            .into_iter()
            .map(|v| f32::from(v) / 127.5 - 1.0)
            .collect();
        Tensor::from_vec(data, (1, INPUT_SIZE, INPUT_SIZE, 3), &self.device)?
            .permute((0, 3, 1, 2))?
            .contiguous()
            .context("failed to build detector input")
    }

    fn forward(&self, input: &Tensor) -> Result<(Vec<f32>, Vec<Vec<f32>>)> {
        let x = input.pad_with_zeros(2, 1, 2)?.pad_with_zeros(3, 1, 2)?;
        let mut x = self.stem.forward(&x)?.relu()?;
        for block in &self.backbone_16 {
            x = block.forward(&x)?;
        }
        let (scores_16, boxes_16) = self.head_16.forward(&x)?;
        for block in &self.backbone_8 {
            x = block.forward(&x)?;
        }
        let (scores_8, boxes_8) = self.head_8.forward(&x)?;

        let scores = Tensor::cat(&[scores_16, scores_8], 0)?.flatten_all()?.to_vec1::<f32>()?;
        let boxes = Tensor::cat(&[boxes_16, boxes_8], 0)?.to_vec2::<f32>()?;
        Ok((scores, boxes))
    }

    /// Detects faces scoring at least `min_score`, best first.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    pub fn detect(&self, image: &image::DynamicImage, min_score: f32) -> Result<Vec<FaceBox>> {
        let input = self.preprocess(image)?;
        let (scores, boxes) = self.forward(&input)?;
        Ok(decode(&self.anchors, &scores, &boxes, min_score))
    }
}

/// Anchor centers for both heads, in head order.
fn anchor_centers() -> Vec<[f32; 2]> {
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);
    for (grid, per_cell) in HEADS {
        for y in 0..grid {
            for x in 0..grid {
                let center = [(x as f32 + 0.5) / grid as f32, (y as f32 + 0.5) / grid as f32];
                anchors.extend(std::iter::repeat(center).take(per_cell));
            }
        }
    }
    anchors
}

/// Turns raw head outputs into merged detections.
fn decode(anchors: &[[f32; 2]], scores: &[f32], boxes: &[Vec<f32>], min_score: f32) -> Vec<FaceBox> {
    let scale = INPUT_SIZE as f32;
    let candidates = anchors
        .iter()
        .zip(scores)
        .zip(boxes)
        .filter_map(|((anchor, &logit), raw)| {
            let score = sigmoid(logit.clamp(-SCORE_CLIP, SCORE_CLIP));
            if score < min_score || raw.len() < BOX_VALUES {
                return None;
            }
            let cx = anchor[0] + raw[0] / scale;
            let cy = anchor[1] + raw[1] / scale;
            let (hw, hh) = (raw[2] / scale / 2.0, raw[3] / scale / 2.0);
            let mut keypoints = [[0.0; 2]; 6];
            for (k, kp) in keypoints.iter_mut().enumerate() {
                *kp = [
                    (anchor[0] + raw[4 + 2 * k] / scale).clamp(0.0, 1.0),
                    (anchor[1] + raw[5 + 2 * k] / scale).clamp(0.0, 1.0),
                ];
            }
            Some(FaceBox {
                bbox: [
                    (cx - hw).clamp(0.0, 1.0),
                    (cy - hh).clamp(0.0, 1.0),
                    (cx + hw).clamp(0.0, 1.0),
                    (cy + hh).clamp(0.0, 1.0),
                ],
                score,
                keypoints,
            })
        })
        .collect();
    weighted_nms(candidates)
}

/// Merges overlapping detections into their score-weighted average.
fn weighted_nms(mut remaining: Vec<FaceBox>) -> Vec<FaceBox> {
    remaining.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut merged = Vec::new();
    while let Some(best) = remaining.first().cloned() {
        let (cluster, rest): (Vec<_>, Vec<_>) = remaining
            .into_iter()
            .partition(|other| iou(&best.bbox, &other.bbox) > MERGE_IOU || *other == best);
        remaining = rest;

        let total: f32 = cluster.iter().map(|d| d.score).sum();
        let mut blended = FaceBox {
            bbox: [0.0; 4],
            score: best.score,
            keypoints: [[0.0; 2]; 6],
        };
        for d in &cluster {
            let w = d.score / total;
            for (acc, v) in blended.bbox.iter_mut().zip(d.bbox) {
                *acc += w * v;
            }
            for (acc, kp) in blended.keypoints.iter_mut().zip(d.keypoints) {
                acc[0] += w * kp[0];
                acc[1] += w * kp[1];
            }
        }
        merged.push(blended);
    }
    merged
}

/// Intersection over union of two corner-form boxes.
fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let iw = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
    let ih = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
    let inter = iw * ih;
    let union = (a[2] - a[0]) * (a[3] - a[1]) + (b[2] - b[0]) * (b[3] - b[1]) - inter;
    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}
