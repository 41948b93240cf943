// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON snapshot files

use crate::geometry::MeshSnapshot;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read and validate a snapshot written by [`save_snapshot`]
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<MeshSnapshot> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read snapshot: {:?}", path))?;
    let snapshot: MeshSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot: {:?}", path))?;
    snapshot
        .validate()
        .with_context(|| format!("Snapshot {:?} is malformed", path))?;
    Ok(snapshot)
}

pub fn save_snapshot(snapshot: &MeshSnapshot, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
    fs::write(path, content).with_context(|| format!("Failed to write snapshot: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("cube.json");
        let cube = Primitive::cube(Vector3::new(1.0, 2.0, 3.0), false).to_skinned_snapshot();

        save_snapshot(&cube, &path)?;
        let loaded = load_snapshot(&path)?;

        assert_eq!(loaded.vertices, cube.vertices);
        assert_eq!(loaded.submesh_indices, cube.submesh_indices);
        assert_eq!(loaded.bind_poses, cube.bind_poses);
        assert_eq!(loaded.bone_weights, cube.bone_weights);
        for (a, b) in loaded.normals.iter().zip(&cube.normals) {
            assert_relative_eq!(a, b, epsilon = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_unskinned_omits_weights() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("plain.json");
        save_snapshot(&Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_snapshot(), &path)?;

        let text = fs::read_to_string(&path)?;
        assert!(!text.contains("bone_weights"));
        assert!(!load_snapshot(&path)?.is_skinned());
        Ok(())
    }

    #[test]
    fn test_rejects_invalid_snapshot() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("bad.json");
        let mut cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_snapshot();
        cube.normals.pop();
        save_snapshot(&cube, &path)?;

        assert!(load_snapshot(&path).is_err());
        Ok(())
    }
}
