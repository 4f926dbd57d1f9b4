mod provenance;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gvd::{InsertError, Point, VoronoiDiagram};
use polars::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

#[derive(Parser)]
#[command(name = "gvd-cli")]
#[command(about = "Build Voronoi diagrams of point and segment sites")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Build a diagram from CSV inputs and write a JSON summary
    Build {
        /// CSV with `x`,`y` columns, one point site per row
        #[arg(long)]
        points: PathBuf,
        /// CSV with `i`,`j` columns: 0-based row indices into the points file
        #[arg(long)]
        segments: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
        /// Run the topology check after every insertion
        #[arg(long)]
        check: bool,
    },
    /// Print version and code revision
    Report,
}

/// Written to `--out`.
#[derive(Debug, Serialize)]
struct Summary {
    num_point_sites: usize,
    num_line_sites: usize,
    num_vertices: usize,
    num_faces: usize,
    num_edges: usize,
    valid: bool,
    max_vertex_error: f64,
    /// Inputs rejected by validation, with the reason.
    rejected: Vec<String>,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Build { points, segments, out, check } => {
            build(&points, segments.as_deref(), &out, check)
        }
        Action::Report => report(),
    }
}

fn build(points: &Path, segments: Option<&Path>, out: &Path, check: bool) -> Result<()> {
    tracing::info!(points = %points.display(), out = %out.display(), "build");
    let pts = read_points(points)?;
    let segs = segments.map(read_segments).transpose()?.unwrap_or_default();
    let summary = build_summary(&pts, &segs, check)?;
    tracing::info!(
        sites = summary.num_point_sites,
        segments = summary.num_line_sites,
        valid = summary.valid,
        "diagram built"
    );

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    std::fs::write(out, serde_json::to_vec_pretty(&summary)?)
        .with_context(|| format!("writing {}", out.display()))?;

    let mut payload = provenance::Payload::new(serde_json::json!({
        "check": check,
        "num_points": pts.len(),
        "num_segments": segs.len(),
    }))
    .with_input(points);
    if let Some(s) = segments {
        payload = payload.with_input(s);
    }
    provenance::write_sidecar(out, payload)?;
    Ok(())
}

/// Insert points then segments. Invalid inputs are skipped and recorded;
/// construction failures abort.
fn build_summary(pts: &[Point], segs: &[(usize, usize)], check: bool) -> Result<Summary> {
    let cfg = gvd::VdCfg { check_each_insertion: check, ..gvd::VdCfg::default() };
    let mut vd = VoronoiDiagram::with_cfg(cfg);
    let mut rejected = Vec::new();
    let mut ids = Vec::with_capacity(pts.len());
    for (row, p) in pts.iter().enumerate() {
        match vd.insert_point_site(*p) {
            Ok(v) => ids.push(Some(v)),
            Err(e) => {
                ids.push(None);
                skip_or_fail(&mut rejected, format!("point {row}"), e)?;
            }
        }
    }
    for (row, &(i, j)) in segs.iter().enumerate() {
        let (Some(&Some(a)), Some(&Some(b))) = (ids.get(i), ids.get(j)) else {
            tracing::warn!(row, i, j, "segment refers to a missing point");
            rejected.push(format!("segment {row}: endpoint index out of range or rejected"));
            continue;
        };
        if let Err(e) = vd.insert_line_site(a, b) {
            skip_or_fail(&mut rejected, format!("segment {row}"), e)?;
        }
    }
    Ok(Summary {
        num_point_sites: vd.num_point_sites(),
        num_line_sites: vd.num_line_sites(),
        num_vertices: vd.num_vertices(),
        num_faces: vd.num_faces(),
        num_edges: vd.num_edges(),
        valid: vd.check(),
        max_vertex_error: vd.error_stats().iter().copied().fold(0.0, f64::max),
        rejected,
    })
}

fn skip_or_fail(rejected: &mut Vec<String>, what: String, e: InsertError) -> Result<()> {
    if !e.is_input_error() {
        bail!("{what}: {e}");
    }
    tracing::warn!(%e, "{what} rejected");
    rejected.push(format!("{what}: {e}"));
    Ok(())
}

fn read_points(path: &Path) -> Result<Vec<Point>> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()
        .with_context(|| format!("reading {}", path.display()))?
        .select([col("x").cast(DataType::Float64), col("y").cast(DataType::Float64)])
        .collect()?;
    let xs = df.column("x")?.f64()?;
    let ys = df.column("y")?.f64()?;
    xs.into_iter()
        .zip(ys.into_iter())
        .enumerate()
        .map(|(row, xy)| match xy {
            (Some(x), Some(y)) => Ok(Point::new(x, y)),
            _ => bail!("{}: missing coordinate in row {row}", path.display()),
        })
        .collect()
}

fn read_segments(path: &Path) -> Result<Vec<(usize, usize)>> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()
        .with_context(|| format!("reading {}", path.display()))?
        .select([col("i").cast(DataType::UInt64), col("j").cast(DataType::UInt64)])
        .collect()?;
    let is = df.column("i")?.u64()?;
    let js = df.column("j")?.u64()?;
    is.into_iter()
        .zip(js.into_iter())
        .enumerate()
        .map(|(row, ij)| match ij {
            (Some(i), Some(j)) => Ok((i as usize, j as usize)),
            _ => bail!("{}: missing index in row {row}", path.display()),
        })
        .collect()
}

fn report() -> Result<()> {
    let obj = serde_json::json!({
        "code_rev": provenance::current_git_rev(),
        "gvd_version": gvd::VERSION,
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
