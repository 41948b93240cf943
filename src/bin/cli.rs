// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshcut CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use meshcut::{analyze, bisect, io, CutError, EngineConfig, JobScheduler, Plane, Primitive};
use nalgebra::{Point3, Vector3};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "meshcut")]
#[command(about = "Plane-based mesh bisection with capped cross-sections", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cut a mesh file in two along a plane
    Cut {
        /// Input mesh (.json snapshot or .stl)
        input: PathBuf,

        /// Point on the cutting plane, as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        point: Vector3<f32>,

        /// Plane normal, as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        normal: Vector3<f32>,

        /// Directory receiving positive.json and negative.json
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Also write STL files next to the snapshots
        #[arg(long)]
        stl: bool,
    },

    /// Run a batch of background cuts on a sphere
    Demo {
        /// Number of cuts to submit
        #[arg(short, long, default_value = "100")]
        count: usize,

        /// Worker threads (defaults to meshcut.toml or the core count)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Write a primitive snapshot
    Primitive {
        #[arg(value_enum)]
        shape: Shape,

        /// Output file (.json or .stl)
        #[arg(short, long)]
        out: PathBuf,

        /// Bind the primitive to a two-bone skeleton
        #[arg(long)]
        skinned: bool,

        /// Sphere resolution
        #[arg(long, default_value = "32")]
        segments: u32,
    },

    /// Print statistics for a mesh file
    Stats {
        /// Input mesh (.json snapshot or .stl)
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum Shape {
    Cube,
    Sphere,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Commands::Cut {
            input,
            point,
            normal,
            out_dir,
            stl,
        } => cut_command(&input, point, normal, &out_dir, stl, cli.verbose)?,
        Commands::Demo { count, workers } => demo_command(count, workers)?,
        Commands::Primitive {
            shape,
            out,
            skinned,
            segments,
        } => primitive_command(shape, &out, skinned, segments)?,
        Commands::Stats { input } => {
            let mesh = io::load_any(&input)?;
            analyze(&mesh).print(&input.display().to_string());
        }
        Commands::Version => {
            println!("Meshcut v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn parse_vec3(value: &str) -> std::result::Result<Vector3<f32>, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected x,y,z but got {:?}", value));
    }
    let mut out = Vector3::zeros();
    for (slot, part) in parts.iter().enumerate() {
        out[slot] = part
            .parse::<f32>()
            .map_err(|e| format!("invalid component {:?}: {}", part, e))?;
    }
    Ok(out)
}

fn cut_command(
    input: &Path,
    point: Vector3<f32>,
    normal: Vector3<f32>,
    out_dir: &Path,
    stl: bool,
    verbose: bool,
) -> Result<()> {
    let mesh = io::load_any(input)?;
    let plane = Plane::try_new(Point3::from(point), normal).context("Invalid cutting plane")?;

    if !mesh.bounding_box().straddles(&plane) {
        println!("{} plane lies outside the mesh bounds", "Note:".yellow());
    }

    let start = Instant::now();
    let pieces = match bisect(&mesh, &plane) {
        Ok(pieces) => pieces,
        Err(CutError::NoIntersection) => {
            println!("{}", "Plane does not intersect the mesh; nothing written".yellow());
            return Ok(());
        }
        Err(e) => return Err(e).context("Cut failed"),
    };
    let elapsed = start.elapsed();

    std::fs::create_dir_all(out_dir).with_context(|| format!("Failed to create {:?}", out_dir))?;
    for (name, piece) in [("positive", &pieces.positive), ("negative", &pieces.negative)] {
        io::save_snapshot(piece, out_dir.join(format!("{}.json", name)))?;
        if stl {
            io::export_stl(piece, out_dir.join(format!("{}.stl", name)))?;
        }
        if verbose {
            analyze(piece).print(name);
        }
    }

    println!(
        "{} {} loop(s) capped in {:.2?} ({} + {} triangles)",
        "✓".green(),
        pieces.loops,
        elapsed,
        pieces.positive.triangle_count(),
        pieces.negative.triangle_count()
    );
    Ok(())
}

fn demo_command(count: usize, workers: Option<usize>) -> Result<()> {
    let mut config = EngineConfig::load()?;
    if workers.is_some() {
        config.workers = workers;
    }

    let scheduler = JobScheduler::new(&config)?;
    let sphere = Arc::new(Primitive::sphere(1.0, 48).to_snapshot());

    println!(
        "{} {} cuts on {} workers",
        "Submitting".bold(),
        count,
        scheduler.worker_count()
    );

    let start = Instant::now();
    for token in 0..count {
        // Offsets sweep past both poles so some planes miss
        let t = if count > 1 { token as f32 / (count - 1) as f32 } else { 0.5 };
        let angle = t * std::f32::consts::TAU;
        let normal = Vector3::new(angle.cos(), 0.5, angle.sin());
        let plane = Plane::new(Point3::from(normal.normalize() * (t * 3.0 - 1.5)), normal);
        scheduler.submit_cut(token, Arc::clone(&sphere), plane);
    }

    let mut successes = 0;
    let mut misses = 0;
    let mut faults = 0;
    while successes + misses + faults < count {
        let results = scheduler.poll_results();
        if results.is_empty() {
            std::thread::sleep(Duration::from_millis(2));
            continue;
        }
        successes += results.successes.len();
        for failure in &results.failures {
            if failure.is_no_intersection() {
                misses += 1;
            } else {
                faults += 1;
                eprintln!("{} cut {}: {}", "Error".red(), failure.token, failure.error);
            }
        }
    }

    println!("\n{}", "Demo Summary".bold());
    println!("  Cut:     {}", successes.to_string().green());
    println!("  Missed:  {}", misses);
    println!(
        "  Faulted: {}",
        if faults > 0 { faults.to_string().red() } else { faults.to_string().green() }
    );
    println!("  Time:    {:.2?}", start.elapsed());
    Ok(())
}

fn primitive_command(shape: Shape, out: &Path, skinned: bool, segments: u32) -> Result<()> {
    let primitive = match shape {
        Shape::Cube => Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true),
        Shape::Sphere => Primitive::sphere(1.0, segments),
    };
    let mesh = if skinned {
        primitive.to_skinned_snapshot()
    } else {
        primitive.to_snapshot()
    };

    let is_stl = out
        .extension()
        .map(|e| e.eq_ignore_ascii_case("stl"))
        .unwrap_or(false);
    if is_stl {
        io::export_stl(&mesh, out)?;
    } else {
        io::save_snapshot(&mesh, out)?;
    }

    println!(
        "{} wrote {} ({} vertices, {} triangles)",
        "✓".green(),
        out.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(())
}
