// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-vertex skinning influences

use crate::utils::math::lerp;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Number of bone influences stored per vertex
pub const MAX_INFLUENCES: usize = 4;

/// Up to four bone indices with their blend weights
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneWeight {
    pub indices: [u32; MAX_INFLUENCES],
    pub weights: [f32; MAX_INFLUENCES],
}

impl BoneWeight {
    pub fn new(indices: [u32; MAX_INFLUENCES], weights: [f32; MAX_INFLUENCES]) -> Self {
        Self { indices, weights }
    }

    /// Fully bound to a single bone
    pub fn single(bone: u32) -> Self {
        Self {
            indices: [bone, 0, 0, 0],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }

    /// Interpolate weights toward `other`, keeping this vertex's bone indices.
    ///
    /// Bone slots are blended position by position, so both endpoints are
    /// expected to list their bones in the same order.
    pub fn lerp(&self, other: &BoneWeight, t: f32) -> BoneWeight {
        let mut weights = [0.0; MAX_INFLUENCES];
        for (slot, weight) in weights.iter_mut().enumerate() {
            *weight = lerp(self.weights[slot], other.weights[slot], t);
        }
        BoneWeight {
            indices: self.indices,
            weights,
        }
    }

    pub fn total(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// Blend many influences into one.
    ///
    /// Weight mass is summed per bone across every input slot, the four
    /// heaviest bones are kept and their weights renormalized to sum to one.
    /// Equal masses keep the order in which the bones were first seen. Unused
    /// slots stay `(0, 0.0)`.
    pub fn blend<'a, I>(weights: I) -> BoneWeight
    where
        I: IntoIterator<Item = &'a BoneWeight>,
    {
        let mut order: Vec<(u32, f32)> = Vec::new();
        let mut slot_of: AHashMap<u32, usize> = AHashMap::new();

        for weight in weights {
            for slot in 0..MAX_INFLUENCES {
                let bone = weight.indices[slot];
                match slot_of.get(&bone) {
                    Some(&i) => order[i].1 += weight.weights[slot],
                    None => {
                        slot_of.insert(bone, order.len());
                        order.push((bone, weight.weights[slot]));
                    }
                }
            }
        }

        // Stable sort: ties stay in first-seen order
        order.sort_by(|a, b| b.1.total_cmp(&a.1));
        order.truncate(MAX_INFLUENCES);

        let total: f32 = order.iter().map(|(_, mass)| mass).sum();
        let mut blended = BoneWeight::default();
        for (slot, (bone, mass)) in order.into_iter().enumerate() {
            blended.indices[slot] = bone;
            blended.weights[slot] = if total != 0.0 { mass / total } else { 0.0 };
        }
        blended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lerp_keeps_first_indices() {
        let a = BoneWeight::new([1, 2, 0, 0], [1.0, 0.0, 0.0, 0.0]);
        let b = BoneWeight::new([7, 8, 0, 0], [0.0, 1.0, 0.0, 0.0]);
        let mid = a.lerp(&b, 0.25);
        assert_eq!(mid.indices, [1, 2, 0, 0]);
        assert_relative_eq!(mid.weights[0], 0.75);
        assert_relative_eq!(mid.weights[1], 0.25);
    }

    #[test]
    fn test_blend_keeps_heaviest_four() {
        let inputs = [
            BoneWeight::new([0, 1, 2, 3], [0.4, 0.3, 0.2, 0.1]),
            BoneWeight::new([4, 1, 2, 5], [0.5, 0.3, 0.1, 0.1]),
        ];
        let blended = BoneWeight::blend(&inputs);

        // Masses: 0=0.4, 1=0.6, 2=0.3, 3=0.1, 4=0.5, 5=0.1
        assert_eq!(blended.indices, [1, 4, 0, 2]);
        assert_relative_eq!(blended.total(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(blended.weights[0], 0.6 / 1.8, epsilon = 1e-6);
    }

    #[test]
    fn test_blend_ties_keep_first_seen_order() {
        let inputs = [BoneWeight::single(9), BoneWeight::single(3)];
        let blended = BoneWeight::blend(&inputs);
        // Bone 0 appears in the unused slots with zero mass
        assert_eq!(blended.indices[0], 9);
        assert_eq!(blended.indices[1], 3);
        assert_relative_eq!(blended.weights[0], 0.5);
        assert_relative_eq!(blended.weights[1], 0.5);
        assert_eq!(blended.weights[2], 0.0);
    }

    #[test]
    fn test_blend_of_nothing_is_default() {
        let blended = BoneWeight::blend(std::iter::empty::<&BoneWeight>());
        assert_eq!(blended, BoneWeight::default());
    }
}
