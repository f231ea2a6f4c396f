pub mod formatter;
pub mod recorder;
pub mod step;

pub use formatter::TraceFormatter;
pub use recorder::{StepBuilder, StepRecorder};
pub use step::*;
