// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - snapshots, cutting planes and the bisection itself

mod accumulator;
mod analytics;
mod bbox;
mod bisect;
mod bone_weight;
mod capping;
mod plane;
mod primitives;
mod snapshot;

pub use accumulator::{CornerVertex, SideAccumulator};
pub use analytics::{analyze, MeshStats};
pub use bbox::BoundingBox;
pub use bisect::{BisectionStats, Bisector, CutPieces};
pub use bone_weight::{BoneWeight, MAX_INFLUENCES};
pub use capping::{build_loops, fill_cap, BoundaryLoop};
pub use plane::{Plane, Side};
pub use primitives::Primitive;
pub use snapshot::MeshSnapshot;
