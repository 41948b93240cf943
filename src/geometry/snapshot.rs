// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Immutable flattened mesh attributes handed to and returned from a cut

use super::{BoneWeight, BoundingBox};
use crate::error::{CutError, CutResult};
use nalgebra::{Matrix4, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Flattened per-vertex attribute buffers plus one index list per submesh.
///
/// All attribute arrays are parallel. Bone weights are present exactly when
/// the source is skinned. Bind poses are carried through a cut untouched for
/// whoever rebinds the skeleton afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSnapshot {
    pub vertices: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub uvs: Vec<Vector2<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bone_weights: Option<Vec<BoneWeight>>,
    pub submesh_indices: Vec<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bind_poses: Vec<Matrix4<f32>>,
}

impl MeshSnapshot {
    pub fn new(
        vertices: Vec<Point3<f32>>,
        normals: Vec<Vector3<f32>>,
        uvs: Vec<Vector2<f32>>,
        submesh_indices: Vec<Vec<u32>>,
    ) -> Self {
        Self {
            vertices,
            normals,
            uvs,
            bone_weights: None,
            submesh_indices,
            bind_poses: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    pub fn with_bone_weights(mut self, bone_weights: Vec<BoneWeight>) -> Self {
        self.bone_weights = Some(bone_weights);
        self
    }

    pub fn with_bind_poses(mut self, bind_poses: Vec<Matrix4<f32>>) -> Self {
        self.bind_poses = bind_poses;
        self
    }

    /// Check the parallel-array and index-range invariants
    pub fn validate(&self) -> CutResult<()> {
        let count = self.vertices.len();
        if self.normals.len() != count {
            return Err(CutError::invalid(format!(
                "{} normals for {} vertices",
                self.normals.len(),
                count
            )));
        }
        if self.uvs.len() != count {
            return Err(CutError::invalid(format!(
                "{} uvs for {} vertices",
                self.uvs.len(),
                count
            )));
        }
        if let Some(weights) = &self.bone_weights {
            if weights.len() != count {
                return Err(CutError::invalid(format!(
                    "{} bone weights for {} vertices",
                    weights.len(),
                    count
                )));
            }
        }

        for (submesh, indices) in self.submesh_indices.iter().enumerate() {
            if indices.len() % 3 != 0 {
                return Err(CutError::invalid(format!(
                    "submesh {} has {} indices, not a multiple of 3",
                    submesh,
                    indices.len()
                )));
            }
            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= count) {
                return Err(CutError::invalid(format!(
                    "submesh {} references vertex {} of {}",
                    submesh, bad, count
                )));
            }
        }

        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn submesh_count(&self) -> usize {
        self.submesh_indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.submesh_indices.iter().map(|s| s.len() / 3).sum()
    }

    pub fn is_skinned(&self) -> bool {
        self.bone_weights.is_some()
    }

    /// Index list of one submesh
    pub fn indices(&self, submesh: usize) -> &[u32] {
        &self.submesh_indices[submesh]
    }

    /// All submesh index lists concatenated, in submesh order
    pub fn triangles(&self) -> Vec<u32> {
        self.submesh_indices.iter().flatten().copied().collect()
    }

    /// Iterate triangles as `(submesh, [i0, i1, i2])`
    pub fn triangle_iter(&self) -> impl Iterator<Item = (usize, [u32; 3])> + '_ {
        self.submesh_indices
            .iter()
            .enumerate()
            .flat_map(|(submesh, indices)| {
                indices
                    .chunks_exact(3)
                    .map(move |tri| (submesh, [tri[0], tri[1], tri[2]]))
            })
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }
}

impl Default for MeshSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshSnapshot {
        MeshSnapshot::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![Vector3::z(); 3],
            vec![Vector2::zeros(); 3],
            vec![vec![0, 1, 2]],
        )
    }

    #[test]
    fn test_valid_snapshot() {
        let mesh = triangle();
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangles(), vec![0, 1, 2]);
        assert!(!mesh.is_skinned());
    }

    #[test]
    fn test_index_out_of_range() {
        let mut mesh = triangle();
        mesh.submesh_indices[0][2] = 3;
        let err = mesh.validate().unwrap_err();
        assert!(matches!(err, CutError::InvalidSnapshot { .. }));
    }

    #[test]
    fn test_mismatched_arrays() {
        let mut mesh = triangle();
        mesh.uvs.pop();
        assert!(mesh.validate().is_err());

        let mesh = triangle().with_bone_weights(vec![BoneWeight::single(0)]);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_partial_triangle() {
        let mut mesh = triangle();
        mesh.submesh_indices.push(vec![0, 1]);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_triangle_iter_tags_submesh() {
        let mut mesh = triangle();
        mesh.submesh_indices.push(vec![2, 1, 0]);
        let tris: Vec<_> = mesh.triangle_iter().collect();
        assert_eq!(tris, vec![(0, [0, 1, 2]), (1, [2, 1, 0])]);
    }
}
