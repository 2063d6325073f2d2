use std::{error::Error, fmt::Display, io::BufRead};

use anyhow::{Context, Result};

use crate::{
    cov::CovarianceMatrix,
    eigen::EigenPair,
    face::FaceVector,
    project::Projection,
    vector::Vec2,
};

/// Reads `x` and `y` columns from delimited text.
///
/// Lines starting with `#` before the header are skipped. The header must name
/// an `x` and a `y` column (case insensitive); other columns are ignored.
pub fn points_from_csv(reader: Box<dyn BufRead>, delimiter: &str) -> Result<Vec<Vec2>> {
    let context = "Parsing CSV to points";

    let mut lines = reader.lines();
    let mut headers = String::from("#");
    while headers.starts_with('#') {
        headers = match lines.next() {
            Some(l) => l.context(context)?,
            None => return Err(TableParserError::EmptyFile).context(context),
        };
    }
    let headers: Vec<String> = headers
        .split(delimiter)
        .map(|h| h.trim().to_lowercase())
        .collect();
    let x_col = column_index(&headers, "x").context(context)?;
    let y_col = column_index(&headers, "y").context(context)?;

    let mut points = Vec::new();
    let mut line_num = 1;
    for line in lines {
        let line = line.context(context)?;
        line_num += 1;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let entries: Vec<&str> = line.split(delimiter).map(|e| e.trim()).collect();
        if entries.len() != headers.len() {
            return Err(TableParserError::LineSizeConflict(line_num)).context(context);
        }
        let x: f64 = entries[x_col]
            .parse()
            .context(format!("Failed to parse x on line {}", line_num))
            .context(context)?;
        let y: f64 = entries[y_col]
            .parse()
            .context(format!("Failed to parse y on line {}", line_num))
            .context(context)?;
        points.push(Vec2::new(x, y));
    }

    if points.is_empty() {
        return Err(TableParserError::NoData).context(context);
    }
    Ok(points)
}

fn column_index(headers: &[String], name: &str) -> Result<usize, TableParserError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| TableParserError::MissingColumn(name.to_string()))
}

/// Rows of already formatted cells, printed as delimited text.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn to_csv(&self, delimiter: &str) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(self.headers.join(delimiter));
        for row in &self.rows {
            lines.push(row.join(delimiter));
        }
        lines.join("\n")
    }

    pub fn from_covariance(cov: &CovarianceMatrix) -> Self {
        let mut table = Table::new(&["row", "c0", "c1"]);
        for (i, row) in cov.rows().iter().enumerate() {
            table.push_row(vec![i.to_string(), row[0].to_string(), row[1].to_string()]);
        }
        table
    }

    pub fn from_eigen(pairs: &[EigenPair], ratios: &[f64]) -> Self {
        let mut table = Table::new(&["component", "eigenvalue", "vx", "vy", "cumulative_ratio"]);
        for (i, (pair, ratio)) in pairs.iter().zip(ratios).enumerate() {
            table.push_row(vec![
                (i + 1).to_string(),
                pair.value.to_string(),
                pair.vector.x.to_string(),
                pair.vector.y.to_string(),
                ratio.to_string(),
            ]);
        }
        table
    }

    pub fn from_projections(projections: &[Projection], mean: Vec2) -> Self {
        let mut table = Table::new(&["id", "x", "y", "coefficient", "rx", "ry"]);
        for p in projections {
            // Shift back out of the centered frame for display.
            let original = p.original.position() + mean;
            let reconstructed = p.reconstructed + mean;
            table.push_row(vec![
                p.original.id.to_string(),
                original.x.to_string(),
                original.y.to_string(),
                p.coefficient.to_string(),
                reconstructed.x.to_string(),
                reconstructed.y.to_string(),
            ]);
        }
        table
    }

    /// One row per pixel row of the face.
    pub fn from_face(face: &FaceVector, places: i32) -> Self {
        let mut table = Table::new(&["c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7"]);
        for row in face.round(places).rows() {
            table.push_row(row.iter().map(|v| v.to_string()).collect());
        }
        table
    }
}

#[derive(Debug, PartialEq)]
pub enum TableParserError {
    EmptyFile,
    NoData,
    LineSizeConflict(usize),
    MissingColumn(String),
}

impl Display for TableParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableParserError::LineSizeConflict(line) => {
                write!(f, "Line {} has a different number of columns to the header", line)
            }
            TableParserError::MissingColumn(name) => write!(f, "No column named {}", name),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Error for TableParserError {}
