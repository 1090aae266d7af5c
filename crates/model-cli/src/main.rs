//! model3d - inspect and convert 3D model files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;

use model_core::{
    bounding_box, calculate_surface_area, calculate_volume, hex_string_to_color, is_solid, Model,
};
use model_formats::{export_model, import_model, ImportSettings};

#[derive(Parser)]
#[command(name = "model3d")]
#[command(about = "Inspect and convert 3D model files (OBJ, STL, OFF)", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Default material color as a hex string (rrggbb)
    #[arg(long, global = true, value_name = "RRGGBB")]
    default_color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show structure and counters of a model file
    Info {
        /// Path to the model file
        file: PathBuf,
        /// Print machine readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Check solidity and compute volume and surface area
    Check {
        /// Path to the model file
        file: PathBuf,
        /// Print machine readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert a model to another format (chosen by extension)
    Convert {
        /// Input model file
        input: PathBuf,
        /// Output model file (.obj, .stl or .off)
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = import_settings(cli.default_color.as_deref())?;

    match cli.command {
        Commands::Info { file, json } => show_info(&file, &settings, json),
        Commands::Check { file, json } => check_model(&file, &settings, json),
        Commands::Convert { input, output } => convert(&input, &output, &settings),
    }
}

fn import_settings(default_color: Option<&str>) -> Result<ImportSettings> {
    let mut settings = ImportSettings::default();
    if let Some(hex) = default_color {
        settings.default_color = hex_string_to_color(hex)
            .with_context(|| format!("invalid default color {:?}, expected rrggbb", hex))?;
    }
    Ok(settings)
}

fn load(path: &Path, settings: &ImportSettings) -> Result<Model> {
    let imported = import_model(path, settings)
        .with_context(|| format!("cannot import {}", path.display()))?;
    Ok(imported.model)
}

#[derive(Serialize)]
struct InfoReport {
    name: String,
    meshes: usize,
    mesh_instances: usize,
    materials: usize,
    vertices: usize,
    triangles: usize,
    bounding_box: Option<[[f64; 3]; 2]>,
}

fn show_info(file: &Path, settings: &ImportSettings, json: bool) -> Result<()> {
    let model = load(file, settings)?;

    let bounds = bounding_box(&model)
        .map(|b| [[b.min.x, b.min.y, b.min.z], [b.max.x, b.max.y, b.max.z]]);
    let report = InfoReport {
        name: model.name().to_string(),
        meshes: model.mesh_count(),
        mesh_instances: model.mesh_instance_count(),
        materials: model.material_count(),
        vertices: model.vertex_count(),
        triangles: model.triangle_count(),
        bounding_box: bounds,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.name.bold());
    println!("  Meshes:     {} ({} instances)", report.meshes, report.mesh_instances);
    println!("  Materials:  {}", report.materials);
    println!("  Vertices:   {}", report.vertices);
    println!("  Triangles:  {}", report.triangles);
    if let Some([min, max]) = report.bounding_box {
        println!(
            "  Bounds:     [{:.3}, {:.3}, {:.3}] to [{:.3}, {:.3}, {:.3}]",
            min[0], min[1], min[2], max[0], max[1], max[2]
        );
    }

    for index in 0..model.mesh_count() {
        let mesh = model.mesh(index);
        println!(
            "  [{}] {}: {} vertices, {} triangles",
            index,
            if mesh.name().is_empty() {
                "<unnamed>"
            } else {
                mesh.name()
            },
            mesh.vertex_count(),
            mesh.triangle_count()
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct CheckReport {
    solid: bool,
    volume: Option<f64>,
    surface_area: f64,
}

fn check_model(file: &Path, settings: &ImportSettings, json: bool) -> Result<()> {
    let model = load(file, settings)?;

    let report = CheckReport {
        solid: is_solid(&model),
        volume: calculate_volume(&model),
        surface_area: calculate_surface_area(&model),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.solid {
        println!("{} model is a closed solid", "✓".green().bold());
    } else {
        println!("{} model is not a closed solid", "⚠".yellow().bold());
    }
    match report.volume {
        Some(volume) => println!("  Volume:       {:.6}", volume),
        None => println!("  Volume:       n/a (not solid)"),
    }
    println!("  Surface area: {:.6}", report.surface_area);
    Ok(())
}

fn convert(input: &Path, output: &Path, settings: &ImportSettings) -> Result<()> {
    let model = load(input, settings)?;
    export_model(&model, output)
        .with_context(|| format!("cannot export {}", output.display()))?;

    println!(
        "{} converted {} to {}",
        "✓".green().bold(),
        input.display(),
        output.display()
    );
    Ok(())
}
