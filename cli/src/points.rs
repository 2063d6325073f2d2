use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use pcalab::{
    eigen,
    project,
    table::{self, Table},
    LabConfig, Pipeline, Stage,
};
use tracing::debug;

use crate::util;

/// Principal component analysis of 2D points
#[derive(Debug, Args)]
#[command(version, about, long_about = None)]
pub struct PointsArgs {
    /// Start from the built-in example (a noisy line)
    #[arg(short, long)]
    example: bool,
    /// Add this many uniformly random points
    #[arg(short, long)]
    random: Option<usize>,
    /// Add a jittered 5x5 grid of points
    #[arg(short, long)]
    grid: bool,
    /// Seed for random and grid points
    #[arg(long)]
    seed: Option<u64>,
    /// Half width of the square random points are drawn from
    #[arg(long, default_value_t = 4.0)]
    random_range: f64,
    /// Stop after this stage
    #[arg(value_enum, short, long, default_value_t = StopAt::Project)]
    until: StopAt,
    /// The format of the file. Guessed from the extension when not given
    #[arg(value_enum, short, long)]
    datatype: Option<DataType>,
    /// CSV delimiter, also used for output
    #[arg(short, long, default_value_t = String::from(","))]
    csv_delim: String,
    /// File containing x,y data. Read from stdin when no other source is given
    filename: Option<PathBuf>,
}

#[derive(Debug, ValueEnum, Clone, Copy, PartialEq)]
pub enum StopAt {
    Mean,
    Center,
    Covariance,
    Eigen,
    Project,
}

#[derive(Debug, ValueEnum, Clone, Copy, PartialEq)]
pub enum DataType {
    /// Delimited by --csv-delim
    Csv,
    /// Tab separated
    Tsv,
}

impl DataType {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match DataType::from_str(ext, true) {
            Ok(dt) => Ok(dt),
            Err(_) => bail!("File extension couldn't be identified on {}", path.display()),
        }
    }

    fn delimiter<'a>(&self, csv_delim: &'a str) -> &'a str {
        match self {
            DataType::Csv => csv_delim,
            DataType::Tsv => "\t",
        }
    }
}

impl StopAt {
    fn stage(&self) -> Stage {
        match self {
            StopAt::Mean => Stage::MeanComputed,
            StopAt::Center => Stage::Centered,
            StopAt::Covariance => Stage::CovarianceComputed,
            StopAt::Eigen => Stage::EigendecompositionDone,
            StopAt::Project => Stage::Projected,
        }
    }
}

pub fn points_main(args: PointsArgs) {
    let config = LabConfig {
        random_range: args.random_range,
        ..LabConfig::default()
    };
    let mut pipeline = Pipeline::with_config(config);

    if let Err(e) = load_points(&args, &mut pipeline) {
        eprintln!("Error loading points: {:#}", e);
        return;
    }
    debug!(points = pipeline.points().len(), "points loaded");

    let delim = &args.csv_delim;
    let stop = args.until.stage();
    while pipeline.stage() < stop {
        let stage = match pipeline.advance() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error calculating pca: {}", e);
                return;
            }
        };
        let section = match render_stage(&pipeline, stage, delim) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error formatting results: {}", e);
                return;
            }
        };
        println!("{}", section);
    }
}

fn load_points(args: &PointsArgs, pipeline: &mut Pipeline) -> Result<()> {
    let mut rng = util::rng(args.seed);
    if args.example {
        pipeline.add_example_points();
    }
    if let Some(count) = args.random {
        pipeline.add_random_points(count, &mut rng);
    }
    if args.grid {
        pipeline.add_grid_points(&mut rng);
    }

    let generated = args.example || args.random.is_some() || args.grid;
    if generated && args.filename.is_none() {
        return Ok(());
    }

    let datatype = match (args.datatype, &args.filename) {
        (Some(dt), _) => dt,
        (None, Some(f)) => DataType::from_path(f)?,
        (None, None) => DataType::Csv,
    };
    let reader = util::get_buff_reader(args.filename.as_deref())?;
    for p in table::points_from_csv(reader, datatype.delimiter(&args.csv_delim))? {
        pipeline.add_point(p.x, p.y);
    }
    Ok(())
}

fn render_stage(pipeline: &Pipeline, stage: Stage, delim: &str) -> Result<String> {
    let body = match stage {
        Stage::Empty => String::new(),
        Stage::MeanComputed => {
            let mean = pipeline.mean_vector()?;
            format!("x{}y\n{}{}{}", delim, mean.x, delim, mean.y)
        }
        Stage::Centered => {
            let mut centered = Table::new(&["id", "x", "y"]);
            for p in pipeline.centered_points()? {
                centered.push_row(vec![p.id.to_string(), p.x.to_string(), p.y.to_string()]);
            }
            centered.to_csv(delim)
        }
        Stage::CovarianceComputed => Table::from_covariance(pipeline.covariance_matrix()?).to_csv(delim),
        Stage::EigendecompositionDone => {
            let pairs = pipeline.eigen_pairs()?;
            let values = eigen::eigenvalues(pairs);
            let ratios: Vec<f64> = (1..=pairs.len())
                .map(|k| project::explained_variance_ratio(&values, k))
                .collect();
            Table::from_eigen(pairs, &ratios).to_csv(delim)
        }
        Stage::Projected => {
            let mean = *pipeline.mean_vector()?;
            let projections = Table::from_projections(pipeline.projections()?, mean);
            format!(
                "{}\n# reconstruction error{}{}",
                projections.to_csv(delim),
                delim,
                pipeline.reconstruction_error()?
            )
        }
    };
    Ok(format!("# {:?}\n{}", stage, body))
}
