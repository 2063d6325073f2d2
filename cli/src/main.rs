mod face;
mod points;
mod util;

use clap::{Parser, Subcommand};
use face::FaceArgs;
use points::PointsArgs;
use tracing_subscriber::EnvFilter;

/// Interactive PCA labs from the command line
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    tool: Tool,
}

/// Labs
#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Tool {
    /// PCA of a 2D point cloud, step by step
    #[command(version, about, long_about = None)]
    Points(PointsArgs),

    /// The 8x8 smiley face lab
    #[command(version, about, long_about = None)]
    Face(FaceArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.tool {
        Tool::Points(args) => points::points_main(args),
        Tool::Face(args) => face::face_main(args),
    }
}
