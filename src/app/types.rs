use crate::routes::{HomeContext, Route};

/// Result of one capture attempt on the capture page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Trigger ignored: camera not ready or a capture already running
    NotReady,
    /// Countdown stopped by the user
    Cancelled,
    /// The page was left before the attempt finished; its result was dropped
    Abandoned,
    /// Verified and routed to the home page
    Navigated(HomeContext),
    /// Submission or extraction failed; the page is retryable
    Failed { message: String },
}

/// Commands delivered to a running capture page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCommand {
    Capture,
    Cancel,
    Exit,
}

/// How a capture page run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageExit {
    Verified(HomeContext),
    /// Returned to the auth page with the form data
    Cancelled,
    /// Another route became current
    Left(Route),
    /// Interrupted by signal or an exit command
    Shutdown,
}
