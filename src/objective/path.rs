//! Path-call evaluator contract.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::Builder;

use super::Evaluator;
use crate::error::EvaluatorError;
use crate::layout::Solution;

/// Writes each layout to a fresh temporary file and passes its path to
/// `F`.
///
/// Every call gets a uniquely named file, so concurrent searches may share
/// one `PathEvaluator`. The file is removed when the call returns, on
/// success, error and unwinding alike.
pub struct PathEvaluator<F> {
    call: F,
    dir: Option<PathBuf>,
    prefix: String,
}

impl<F> PathEvaluator<F>
where
    F: Fn(&Path) -> Result<f64, EvaluatorError>,
{
    pub fn new(call: F) -> Self {
        Self {
            call,
            dir: None,
            prefix: "knot-layout-".to_string(),
        }
    }

    /// Places temporary files in `dir` instead of the system temp dir.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl<F> Evaluator for PathEvaluator<F>
where
    F: Fn(&Path) -> Result<f64, EvaluatorError>,
{
    fn evaluate(&self, solution: &Solution) -> Result<f64, EvaluatorError> {
        let mut builder = Builder::new();
        builder.prefix(&self.prefix).suffix(".txt");
        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(solution.to_text().as_bytes())?;
        file.flush()?;

        // `file` is deleted on drop, whatever `call` returns.
        (self.call)(file.path())
    }
}
