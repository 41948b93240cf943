// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshcut
//!
//! Plane-based mesh bisection. A mesh snapshot is split by an infinite plane
//! into two independently closed pieces, carrying positions, normals, UVs,
//! submeshes and skinning weights across the cut. Cuts can run synchronously
//! through [`bisect`] or in the background through [`JobScheduler`].

pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod scheduler;
pub mod utils;

pub use config::EngineConfig;
pub use error::{CutError, CutResult};
pub use geometry::{
    analyze, BisectionStats, Bisector, BoneWeight, BoundingBox, CutPieces, MeshSnapshot, MeshStats, Plane,
    Primitive, Side,
};
pub use io::{export_stl, import_stl, load_snapshot, save_snapshot};
pub use scheduler::{CutFailure, CutSuccess, JobScheduler, PollResults};

/// Cut `snapshot` along `plane` on the calling thread
pub fn bisect(snapshot: &MeshSnapshot, plane: &Plane) -> CutResult<CutPieces> {
    Bisector::run(snapshot, plane)
}
