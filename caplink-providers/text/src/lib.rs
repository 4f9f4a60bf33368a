//! Text provider reading one `x y z` point per line of UTF-8 input.
//!
//! Coordinates may be separated by whitespace, commas, or both. Blank lines
//! and lines starting with `#` are skipped, so point indices count data
//! lines only.
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    num::ParseFloatError,
    path::Path,
};

use caplink_core::{Point, PointSource, PointSourceError};
use thiserror::Error;

/// Failures raised while reading a text point file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TextPointProviderError {
    /// A data line did not hold exactly three coordinates.
    #[error("line {line}: expected 3 coordinates but found {found}")]
    WrongFieldCount {
        /// One-based line number in the input.
        line: usize,
        /// Number of fields found on the line.
        found: usize,
    },
    /// A field could not be parsed as a floating-point number.
    #[error("line {line}: `{field}` is not a number")]
    InvalidNumber {
        /// One-based line number in the input.
        line: usize,
        /// The offending field.
        field: String,
        /// Parser failure.
        #[source]
        source: ParseFloatError,
    },
    /// Reading the input failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Points parsed from line-oriented text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPointProvider {
    name: String,
    points: Vec<Point>,
}

impl TextPointProvider {
    /// Wraps already-parsed points.
    ///
    /// # Examples
    /// ```
    /// use caplink_core::{Point, PointSource};
    /// use caplink_providers_text::TextPointProvider;
    ///
    /// let provider = TextPointProvider::new("demo", vec![Point::new(1.0, 2.0, 3.0)]);
    /// assert_eq!(provider.len(), 1);
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Parses points from a buffered reader.
    ///
    /// # Errors
    /// Returns [`TextPointProviderError::Io`] when reading fails and a parse
    /// error naming the one-based line number for malformed lines.
    ///
    /// # Examples
    /// ```
    /// use std::io::Cursor;
    ///
    /// use caplink_core::{Point, PointSource};
    /// use caplink_providers_text::TextPointProvider;
    ///
    /// let text = "# x y z\n0 0 0\n1.5, 2, -3\n";
    /// let provider = TextPointProvider::try_from_reader("demo", Cursor::new(text))?;
    /// assert_eq!(provider.point(1)?, Point::new(1.5, 2.0, -3.0));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_from_reader<R: BufRead>(
        name: impl Into<String>,
        reader: R,
    ) -> Result<Self, TextPointProviderError> {
        let mut points = Vec::new();
        for (offset, line) in reader.lines().enumerate() {
            let line = line?;
            if let Some(point) = parse_line(offset + 1, &line)? {
                points.push(point);
            }
        }
        Ok(Self::new(name, points))
    }

    /// Opens `path` and parses its points.
    ///
    /// # Errors
    /// Returns [`TextPointProviderError::Io`] when the file cannot be
    /// opened and the errors of [`Self::try_from_reader`] otherwise.
    pub fn try_from_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, TextPointProviderError> {
        let file = File::open(path)?;
        Self::try_from_reader(name, BufReader::new(file))
    }

    /// Borrows the parsed points in input order.
    #[must_use]
    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }
}

fn parse_line(line: usize, text: &str) -> Result<Option<Point>, TextPointProviderError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let fields: Vec<&str> = trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|field| !field.is_empty())
        .collect();
    let &[x, y, z] = fields.as_slice() else {
        return Err(TextPointProviderError::WrongFieldCount {
            line,
            found: fields.len(),
        });
    };
    Ok(Some(Point::new(
        parse_coordinate(line, x)?,
        parse_coordinate(line, y)?,
        parse_coordinate(line, z)?,
    )))
}

fn parse_coordinate(line: usize, field: &str) -> Result<f64, TextPointProviderError> {
    field
        .parse::<f64>()
        .map_err(|source| TextPointProviderError::InvalidNumber {
            line,
            field: field.to_owned(),
            source,
        })
}

impl PointSource for TextPointProvider {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn point(&self, index: usize) -> Result<Point, PointSourceError> {
        self.points
            .get(index)
            .copied()
            .ok_or(PointSourceError::OutOfBounds { index })
    }

    fn points(&self) -> Result<Vec<Point>, PointSourceError> {
        Ok(self.points.clone())
    }
}
