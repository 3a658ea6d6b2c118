//! Cell methods: statistical operations applied along coordinates.

use std::fmt;

/// A statistical reduction such as `mean: time (interval: 1 hour)`.
///
/// The three lists are independent; comments in particular may be shorter
/// than the coordinate list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellMethod {
    pub method: String,
    pub coord_names: Vec<String>,
    pub intervals: Vec<String>,
    pub comments: Vec<String>,
}

impl CellMethod {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            coord_names: Vec::new(),
            intervals: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn with_coords<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.coord_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_intervals<I, S>(mut self, intervals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.intervals = intervals.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_comments<I, S>(mut self, comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comments = comments.into_iter().map(Into::into).collect();
        self
    }
}

/// CF `cell_methods` notation.
impl fmt::Display for CellMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in &self.coord_names {
            write!(f, "{}: ", name)?;
        }
        f.write_str(&self.method)?;
        for interval in &self.intervals {
            write!(f, " (interval: {})", interval)?;
        }
        for comment in &self.comments {
            write!(f, " (comment: {})", comment)?;
        }
        Ok(())
    }
}
