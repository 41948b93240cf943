// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Snapshot analytics: area, enclosed volume and boundary edges

use super::MeshSnapshot;
use ahash::AHashMap;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Geometry statistics of one snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshStats {
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Total surface area in square units
    pub surface_area: f64,
    /// Signed enclosed volume; positive for outward winding
    pub volume: f64,
    /// Undirected edges, welded by position, used by exactly one triangle
    pub open_edges: usize,
}

impl MeshStats {
    pub fn is_closed(&self) -> bool {
        self.triangle_count > 0 && self.open_edges == 0
    }

    /// Pretty print statistics
    pub fn print(&self, title: &str) {
        println!("╔══════════════════════════════════════════╗");
        println!("║ {:<40} ║", title);
        println!("╠══════════════════════════════════════════╣");
        println!("║ Vertices:      {:>25} ║", self.vertex_count);
        println!("║ Triangles:     {:>25} ║", self.triangle_count);
        println!("║ Surface area:  {:>25.4} ║", self.surface_area);
        println!("║ Volume:        {:>25.4} ║", self.volume);
        println!(
            "║ Closed:        {:>25} ║",
            if self.is_closed() { "Yes" } else { "No" }
        );
        println!("╚══════════════════════════════════════════╝");
    }
}

/// Analyze a snapshot across all of its submeshes
pub fn analyze(mesh: &MeshSnapshot) -> MeshStats {
    let triangle_count = mesh.triangle_count();
    if mesh.vertex_count() == 0 || triangle_count == 0 {
        return MeshStats {
            vertex_count: mesh.vertex_count(),
            ..MeshStats::default()
        };
    }

    MeshStats {
        vertex_count: mesh.vertex_count(),
        triangle_count,
        surface_area: calculate_surface_area(mesh),
        volume: calculate_volume(mesh),
        open_edges: count_open_edges(mesh),
    }
}

fn corners(mesh: &MeshSnapshot, triangle: [u32; 3]) -> [Point3<f32>; 3] {
    triangle.map(|i| mesh.vertices[i as usize])
}

/// Sum of signed tetrahedra against the origin
fn calculate_volume(mesh: &MeshSnapshot) -> f64 {
    mesh.triangle_iter()
        .map(|(_, t)| {
            let [v0, v1, v2] = corners(mesh, t);
            (v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0) as f64
        })
        .sum()
}

fn calculate_surface_area(mesh: &MeshSnapshot) -> f64 {
    mesh.triangle_iter()
        .map(|(_, t)| {
            let [v0, v1, v2] = corners(mesh, t);
            ((v1 - v0).cross(&(v2 - v0)).norm() / 2.0) as f64
        })
        .sum()
}

/// Count boundary edges after welding vertices by exact position.
///
/// Edges that collapse to a single point are ignored.
fn count_open_edges(mesh: &MeshSnapshot) -> usize {
    let mut welded: AHashMap<[u32; 3], usize> = AHashMap::new();
    let ids: Vec<usize> = mesh
        .vertices
        .iter()
        .map(|v| {
            let next = welded.len();
            *welded
                .entry([v.x.to_bits(), v.y.to_bits(), v.z.to_bits()])
                .or_insert(next)
        })
        .collect();

    let mut edge_count: AHashMap<(usize, usize), usize> = AHashMap::new();
    for (_, triangle) in mesh.triangle_iter() {
        for i in 0..3 {
            let a = ids[triangle[i] as usize];
            let b = ids[triangle[(i + 1) % 3] as usize];
            if a == b {
                continue;
            }
            let edge = if a < b { (a, b) } else { (b, a) };
            *edge_count.entry(edge).or_insert(0) += 1;
        }
    }

    edge_count.values().filter(|&&count| count == 1).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;
    use nalgebra::{Vector2, Vector3};

    #[test]
    fn test_analyze_cube() {
        let mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_snapshot();
        let stats = analyze(&mesh);

        assert_relative_eq!(stats.volume, 1000.0, epsilon = 1e-2);
        assert_relative_eq!(stats.surface_area, 600.0, epsilon = 1e-2);
        assert_eq!(stats.vertex_count, 8);
        assert_eq!(stats.triangle_count, 12);
        assert!(stats.is_closed());
    }

    #[test]
    fn test_open_triangle() {
        let mesh = MeshSnapshot::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            vec![Vector3::z(); 3],
            vec![Vector2::zeros(); 3],
            vec![vec![0, 1, 2]],
        );
        let stats = analyze(&mesh);
        assert_eq!(stats.open_edges, 3);
        assert!(!stats.is_closed());
        assert_relative_eq!(stats.surface_area, 0.5);
    }

    #[test]
    fn test_empty_mesh() {
        let stats = analyze(&MeshSnapshot::empty());
        assert_eq!(stats, MeshStats::default());
        assert!(!stats.is_closed());
    }
}
