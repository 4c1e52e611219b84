pub mod keyboard_input;

mod builder;
mod page;
mod runner;
mod types;


pub use builder::CapturePageBuilder;
pub use page::CapturePage;
pub use runner::run_capture_page;
pub use types::{CaptureOutcome, PageCommand, PageExit};
