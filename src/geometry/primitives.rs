// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Snapshot generators for demos, tests and benchmarks

use super::{BoneWeight, MeshSnapshot};
use nalgebra::{Matrix4, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Closed, outward-wound source shapes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Cube { size: Vector3<f32>, center: bool },
    Sphere { radius: f32, segments: u32 },
}

impl Primitive {
    pub fn cube(size: Vector3<f32>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    /// UV sphere with `segments` slices and stacks; zero picks 32
    pub fn sphere(radius: f32, segments: u32) -> Self {
        let segments = if segments > 0 { segments.max(3) } else { 32 };
        Self::Sphere { radius, segments }
    }

    pub fn to_snapshot(&self) -> MeshSnapshot {
        match self {
            Self::Cube { size, center } => generate_cube(*size, *center),
            Self::Sphere { radius, segments } => generate_sphere(*radius, *segments),
        }
    }

    /// Snapshot bound to a two-bone skeleton blended along the y axis
    pub fn to_skinned_snapshot(&self) -> MeshSnapshot {
        let mesh = self.to_snapshot();
        let bbox = mesh.bounding_box();
        let height = bbox.size().y;

        let weights = mesh
            .vertices
            .iter()
            .map(|v| {
                let t = if height > 0.0 {
                    ((v.y - bbox.min.y) / height).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                BoneWeight::new([0, 1, 0, 0], [1.0 - t, t, 0.0, 0.0])
            })
            .collect();

        mesh.with_bone_weights(weights)
            .with_bind_poses(vec![Matrix4::identity(), Matrix4::new_translation(&Vector3::new(0.0, -height, 0.0))])
    }
}

/// Eight shared corners, twelve triangles in one submesh
fn generate_cube(size: Vector3<f32>, center: bool) -> MeshSnapshot {
    let min = if center { -size / 2.0 } else { Vector3::zeros() };
    let max = min + size;

    let vertices = vec![
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];

    let middle = Point3::from((min + max) / 2.0);
    let normals = vertices
        .iter()
        .map(|v| (v - middle).try_normalize(0.0).unwrap_or_else(Vector3::z))
        .collect();
    let uvs = vertices
        .iter()
        .map(|v| {
            Vector2::new(
                if size.x != 0.0 { (v.x - min.x) / size.x } else { 0.0 },
                if size.y != 0.0 { (v.y - min.y) / size.y } else { 0.0 },
            )
        })
        .collect();

    let indices = vec![
        // Front (z+)
        4, 5, 6, 4, 6, 7,
        // Back (z-)
        1, 0, 3, 1, 3, 2,
        // Right (x+)
        5, 1, 2, 5, 2, 6,
        // Left (x-)
        0, 4, 7, 0, 7, 3,
        // Top (y+)
        7, 6, 2, 7, 2, 3,
        // Bottom (y-)
        0, 1, 5, 0, 5, 4,
    ];

    MeshSnapshot::new(vertices, normals, uvs, vec![indices])
}

fn generate_sphere(radius: f32, segments: u32) -> MeshSnapshot {
    let stacks = segments;
    let slices = segments;

    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();

    for i in 0..=stacks {
        for j in 0..=slices {
            // Poles and the seam column reuse exactly the same coordinates
            let position = if i == 0 {
                Point3::new(0.0, radius, 0.0)
            } else if i == stacks {
                Point3::new(0.0, -radius, 0.0)
            } else {
                let phi = PI * i as f32 / stacks as f32;
                let theta = 2.0 * PI * (j % slices) as f32 / slices as f32;
                let ring = radius * phi.sin();
                Point3::new(ring * theta.cos(), radius * phi.cos(), ring * theta.sin())
            };

            vertices.push(position);
            normals.push(position.coords.try_normalize(0.0).unwrap_or_else(Vector3::y));
            uvs.push(Vector2::new(j as f32 / slices as f32, i as f32 / stacks as f32));
        }
    }

    let mut indices = Vec::new();
    for i in 0..stacks {
        for j in 0..slices {
            let first = i * (slices + 1) + j;
            let second = first + slices + 1;

            if i != 0 {
                indices.extend_from_slice(&[first, first + 1, second]);
            }
            if i != stacks - 1 {
                indices.extend_from_slice(&[second, first + 1, second + 1]);
            }
        }
    }

    MeshSnapshot::new(vertices, normals, uvs, vec![indices])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::analyze;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_layout() {
        let mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_snapshot();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.submesh_count(), 1);
        assert!(mesh.validate().is_ok());
        assert!(!mesh.is_skinned());
    }

    #[test]
    fn test_cube_is_closed_and_outward() {
        let stats = analyze(&Primitive::cube(Vector3::new(2.0, 3.0, 4.0), false).to_snapshot());
        assert_eq!(stats.open_edges, 0);
        assert_relative_eq!(stats.volume, 24.0, epsilon = 1e-4);
        assert_relative_eq!(stats.surface_area, 52.0, epsilon = 1e-4);
    }

    #[test]
    fn test_sphere_is_closed_and_outward() {
        let mesh = Primitive::sphere(1.0, 24).to_snapshot();
        assert!(mesh.validate().is_ok());

        let stats = analyze(&mesh);
        assert_eq!(stats.open_edges, 0);
        let expected = (4.0 / 3.0 * PI) as f64;
        assert!(stats.volume > 0.0);
        assert!((stats.volume - expected).abs() < expected * 0.05);
    }

    #[test]
    fn test_skinned_snapshot() {
        let mesh = Primitive::cube(Vector3::new(1.0, 2.0, 1.0), false).to_skinned_snapshot();
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.bind_poses.len(), 2);

        let weights = mesh.bone_weights.as_ref().unwrap();
        for weight in weights {
            assert_relative_eq!(weight.total(), 1.0, epsilon = 1e-6);
        }
        // Bottom corner belongs to the first bone, top corner to the second
        assert_relative_eq!(weights[0].weights[0], 1.0);
        assert_relative_eq!(weights[2].weights[1], 1.0);
    }
}
