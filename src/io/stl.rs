// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Binary STL import and export

use crate::geometry::MeshSnapshot;
use crate::utils::math::calculate_triangle_normal;
use anyhow::{Context, Result};
use nalgebra::{Point3, Vector2, Vector3};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use stl_io::{Normal, Triangle, Vertex};

/// Write every submesh of a snapshot as one binary STL.
///
/// Facet normals come from the triangle geometry, not from vertex normals.
pub fn export_stl(snapshot: &MeshSnapshot, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let triangles: Vec<Triangle> = snapshot
        .triangle_iter()
        .map(|(_, t)| {
            let [v0, v1, v2] = t.map(|i| snapshot.vertices[i as usize]);
            let normal = calculate_triangle_normal(&v0, &v1, &v2);

            Triangle {
                normal: Normal::new([normal.x, normal.y, normal.z]),
                vertices: [
                    Vertex::new([v0.x, v0.y, v0.z]),
                    Vertex::new([v1.x, v1.y, v1.z]),
                    Vertex::new([v2.x, v2.y, v2.z]),
                ],
            }
        })
        .collect();

    let file = File::create(path).with_context(|| format!("Failed to create STL file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter())
        .with_context(|| format!("Failed to write STL file: {:?}", path))?;
    Ok(())
}

/// Read an STL into a single-submesh snapshot.
///
/// Every facet gets three fresh vertices carrying the facet normal and zero
/// UVs. Positions still come from the shared STL vertex table, so facets that
/// meet at a point meet at bit-identical coordinates.
pub fn import_stl(path: impl AsRef<Path>) -> Result<MeshSnapshot> {
    let path = path.as_ref();
    let mut file = File::open(path).with_context(|| format!("Failed to open STL file: {:?}", path))?;
    let stl = stl_io::read_stl(&mut file).with_context(|| format!("Failed to read STL file: {:?}", path))?;

    let mut vertices = Vec::with_capacity(stl.faces.len() * 3);
    let mut normals = Vec::with_capacity(stl.faces.len() * 3);
    let mut indices = Vec::with_capacity(stl.faces.len() * 3);

    for face in &stl.faces {
        let normal = Vector3::new(face.normal[0], face.normal[1], face.normal[2]);
        for &corner in &face.vertices {
            let v = &stl.vertices[corner];
            indices.push(vertices.len() as u32);
            vertices.push(Point3::new(v[0], v[1], v[2]));
            normals.push(normal);
        }
    }

    let uvs = vec![Vector2::zeros(); vertices.len()];
    Ok(MeshSnapshot::new(vertices, normals, uvs, vec![indices]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{analyze, Primitive};
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_export_and_import() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("cube.stl");
        let cube = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true).to_snapshot();

        export_stl(&cube, &path)?;
        let loaded = import_stl(&path)?;

        assert_eq!(loaded.triangle_count(), 12);
        assert_eq!(loaded.vertex_count(), 36);
        assert!(loaded.validate().is_ok());

        let stats = analyze(&loaded);
        assert_eq!(stats.open_edges, 0);
        assert_relative_eq!(stats.volume, 8.0, epsilon = 1e-4);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        assert!(import_stl("/nonexistent/mesh.stl").is_err());
    }
}
