mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::pipeline::RunReport;
use miette::Result;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

/// Reporter for outputting the result of a cleanup run
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    verbose: bool,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn report(&self, run: &RunReport) -> Result<()> {
        match self.format {
            ReportFormat::Terminal => TerminalReporter::new()
                .with_verbose(self.verbose)
                .report(run),
            ReportFormat::Json => JsonReporter::new(self.output_path.clone()).report(run),
        }
    }
}
