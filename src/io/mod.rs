// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - snapshot persistence and STL interchange

mod json;
mod stl;

pub use json::{load_snapshot, save_snapshot};
pub use stl::{export_stl, import_stl};

use crate::geometry::MeshSnapshot;
use anyhow::{bail, Result};
use std::path::Path;

/// Load a snapshot from `.json` or `.stl`, chosen by extension
pub fn load_any(path: impl AsRef<Path>) -> Result<MeshSnapshot> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
        Some(ext) if ext == "json" => load_snapshot(path),
        Some(ext) if ext == "stl" => import_stl(path),
        _ => bail!("Unsupported mesh file: {:?} (expected .json or .stl)", path),
    }
}
