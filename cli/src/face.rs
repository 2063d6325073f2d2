use clap::{Args, Subcommand, ValueEnum};
use pcalab::{
    face::{self, Expression, FaceBasis, SynthesisTarget, DEFAULT_VARIANCE_TARGET},
    table::Table,
};

/// The 8x8 smiley face lab
#[derive(Debug, Args)]
#[command(version, about, long_about = None)]
pub struct FaceArgs {
    #[command(subcommand)]
    tool: FaceTool,
    /// CSV delimiter
    #[arg(short, long, default_value_t = String::from(","), global = true)]
    csv_delim: String,
    /// Decimal places for pixel values
    #[arg(long, default_value_t = 2, global = true)]
    places: i32,
}

#[derive(Subcommand, Debug)]
enum FaceTool {
    /// Mean face plus weighted eigenfaces (mouth, eyes, brows)
    Synth {
        /// One to three coefficients
        #[arg(allow_negative_numbers = true, num_args = 1..=3)]
        coefficients: Vec<f64>,
        /// Report how close the coefficients are to a target face
        #[arg(value_enum, short, long)]
        target: Option<Target>,
    },
    /// Rebuild a face from its first k components
    Reconstruct {
        /// happy, smile, laugh, smirk, sad, surprised or angry
        #[arg(short, long, default_value_t = String::from("happy"))]
        face: String,
        /// Number of components
        #[arg(short, long, default_value_t = 3)]
        k: usize,
    },
    /// Smallest k reaching the variance threshold
    OptimalK {
        #[arg(short, long, default_value_t = DEFAULT_VARIANCE_TARGET)]
        threshold: f64,
    },
    /// Gallery face nearest the mean face
    Closest,
    /// Pixels that vary most across the gallery
    Pixels {
        #[arg(short = 'n', long, default_value_t = 3)]
        count: usize,
    },
}

#[derive(Debug, ValueEnum, Clone, Copy)]
enum Target {
    SlightlyHappy,
    SlightlySad,
    Surprised,
    Neutral,
}

impl From<Target> for SynthesisTarget {
    fn from(value: Target) -> Self {
        match value {
            Target::SlightlyHappy => SynthesisTarget::SlightlyHappy,
            Target::SlightlySad => SynthesisTarget::SlightlySad,
            Target::Surprised => SynthesisTarget::Surprised,
            Target::Neutral => SynthesisTarget::Neutral,
        }
    }
}

pub fn face_main(args: FaceArgs) {
    let basis = match FaceBasis::smiley() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error building face basis: {}", e);
            return;
        }
    };
    let delim = &args.csv_delim;

    match args.tool {
        FaceTool::Synth { coefficients, target } => {
            let synthesized = match basis.synthesize_face(&coefficients) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Error synthesizing face: {}", e);
                    return;
                }
            };
            println!("{}", Table::from_face(&synthesized, args.places).to_csv(delim));
            if let Some(target) = target {
                // Missing coefficients count as zero against the three targets.
                let mut padded = coefficients.clone();
                padded.resize(3, 0.0);
                let target = SynthesisTarget::from(target);
                match (target.similarity(&padded), target.is_match(&padded)) {
                    (Ok(s), Ok(matched)) => {
                        println!("# similarity{}{}", delim, s);
                        println!("# match{}{}", delim, matched);
                    }
                    (Err(e), _) | (_, Err(e)) => eprintln!("Error comparing with target: {}", e),
                }
            }
        }
        FaceTool::Reconstruct { face, k } => {
            let expression = match Expression::from_name(&face) {
                Some(e) => e,
                None => {
                    eprintln!("Unknown face {}", face);
                    return;
                }
            };
            let original = expression.face();
            let reconstructed = match basis.reconstruct_face(&original, k) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Error reconstructing face: {}", e);
                    return;
                }
            };
            println!("{}", Table::from_face(&reconstructed, args.places).to_csv(delim));
            match basis.reconstruction_error(&original, k) {
                Ok(err) => println!("# reconstruction error{}{}", delim, err),
                Err(e) => eprintln!("Error calculating reconstruction error: {}", e),
            }
            println!("# explained variance{}{}", delim, basis.explained_variance(k));
            println!("# compression ratio{}{}", delim, basis.compression_ratio(k));
        }
        FaceTool::OptimalK { threshold } => match basis.optimal_k(threshold) {
            Some(k) => println!("{}", k),
            None => eprintln!("No k reaches an explained variance of {}", threshold),
        },
        FaceTool::Closest => {
            let gallery = Expression::gallery();
            let closest = match face::closest_to_mean(&gallery) {
                Ok(i) => i,
                Err(e) => {
                    eprintln!("Error finding closest face: {}", e);
                    return;
                }
            };
            let mut table = Table::new(&["face", "distance", "closest"]);
            for (i, (expression, f)) in Expression::GALLERY.iter().zip(&gallery).enumerate() {
                let distance = match basis.reconstruction_error(f, 0) {
                    Ok(d) => d,
                    Err(e) => {
                        eprintln!("Error calculating distance to the mean: {}", e);
                        return;
                    }
                };
                table.push_row(vec![
                    expression.to_string(),
                    distance.to_string(),
                    (i == closest).to_string(),
                ]);
            }
            println!("{}", table.to_csv(delim));
        }
        FaceTool::Pixels { count } => {
            let pixels = match face::most_varying_pixels(&Expression::gallery(), count) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Error calculating pixel variance: {}", e);
                    return;
                }
            };
            let mut table = Table::new(&["row", "col"]);
            for (row, col) in pixels {
                table.push_row(vec![row.to_string(), col.to_string()]);
            }
            println!("{}", table.to_csv(delim));
        }
    }
}
