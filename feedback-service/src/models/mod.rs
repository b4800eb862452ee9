pub mod feedback;
pub mod run;

pub use feedback::{AnalyzeRequest, AnalyzeResponse, Category, FeedbackItem, SchemaError};
pub use run::{AnalysisRun, AnalysisRunRow, RunSummary};
