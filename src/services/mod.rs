//! Services that sit around the pipeline rather than inside it
//!
//! - `progress`: stage transition reporting
//! - `io`: reading uploads and writing results for the CLI

pub mod io;
pub mod progress;

pub use io::ImageIOService;
pub use progress::{
    ConsoleProgressReporter, NoOpProgressReporter, ProgressReporter, ProgressUpdate,
    RecordingProgressReporter,
};
