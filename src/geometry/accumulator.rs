// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Growable output buffers for one side of a cut

use super::{BoneWeight, MeshSnapshot};
use crate::utils::math::winding_normal;
use nalgebra::{Point3, Vector2, Vector3};

/// Fully attributed corner of a triangle that is not in the source buffers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerVertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub uv: Vector2<f32>,
    pub bone_weight: Option<BoneWeight>,
}

impl CornerVertex {
    /// Copy the attributes of vertex `index` out of a snapshot
    pub fn from_source(source: &MeshSnapshot, index: usize) -> Self {
        Self {
            position: source.vertices[index],
            normal: source.normals[index],
            uv: source.uvs[index],
            bone_weight: source.bone_weights.as_ref().map(|w| w[index]),
        }
    }
}

/// Accumulates the triangles of one resulting piece.
///
/// Triangles never share vertices: each appended triangle pushes three fresh
/// attribute tuples. The last submesh slot is reserved for cap faces.
#[derive(Debug, Clone)]
pub struct SideAccumulator {
    vertices: Vec<Point3<f32>>,
    normals: Vec<Vector3<f32>>,
    uvs: Vec<Vector2<f32>>,
    bone_weights: Option<Vec<BoneWeight>>,
    submesh_indices: Vec<Vec<u32>>,
}

impl SideAccumulator {
    /// Create buffers for `source_submeshes` submeshes plus the cap slot
    pub fn new(source_submeshes: usize, skinned: bool) -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            bone_weights: skinned.then(Vec::new),
            submesh_indices: vec![Vec::new(); source_submeshes + 1],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Index of the submesh that receives cap triangles
    pub fn cap_submesh(&self) -> usize {
        self.submesh_indices.len() - 1
    }

    /// Copy a whole source triangle in its original winding
    pub fn add_source_triangle(&mut self, source: &MeshSnapshot, corners: [u32; 3], submesh: usize) {
        for index in corners {
            self.push_vertex(&CornerVertex::from_source(source, index as usize));
        }
        self.push_indices(submesh);
    }

    /// Append a triangle, reversing its winding when its geometric normal
    /// opposes `face_normal`
    pub fn add_triangle(&mut self, corners: [CornerVertex; 3], face_normal: &Vector3<f32>, submesh: usize) {
        let orientation = winding_normal(
            &corners[0].position,
            &corners[1].position,
            &corners[2].position,
        );
        let order = if orientation.dot(face_normal) < 0.0 {
            [2, 1, 0]
        } else {
            [0, 1, 2]
        };

        for i in order {
            self.push_vertex(&corners[i]);
        }
        self.push_indices(submesh);
    }

    fn push_vertex(&mut self, vertex: &CornerVertex) {
        self.vertices.push(vertex.position);
        self.normals.push(vertex.normal);
        self.uvs.push(vertex.uv);
        if let Some(weights) = &mut self.bone_weights {
            weights.push(vertex.bone_weight.unwrap_or_default());
        }
    }

    fn push_indices(&mut self, submesh: usize) {
        let base = (self.vertices.len() - 3) as u32;
        self.submesh_indices[submesh].extend_from_slice(&[base, base + 1, base + 2]);
    }

    /// Freeze the buffers into an immutable snapshot
    pub fn into_snapshot(self) -> MeshSnapshot {
        MeshSnapshot {
            vertices: self.vertices,
            normals: self.normals,
            uvs: self.uvs,
            bone_weights: self.bone_weights,
            submesh_indices: self.submesh_indices,
            bind_poses: Vec::new(),
        }
    }
}
