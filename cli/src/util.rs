use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};

/// Buffered reader over `filename`, or stdin when there is none.
pub fn get_buff_reader(filename: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match filename {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Opening {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Seeded when asked for reproducible points, otherwise from entropy.
pub fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
