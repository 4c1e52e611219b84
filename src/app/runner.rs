use super::page::CapturePage;
use super::types::{CaptureOutcome, PageCommand, PageExit};
use crate::error::Result;
use crate::routes::Route;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Serialize page events for one visit to the capture page.
///
/// Commands arriving while a capture is in flight can only stop the
/// countdown; a submission already sent is allowed to finish.
pub async fn run_capture_page(
    page: &mut CapturePage,
    mut commands: mpsc::Receiver<PageCommand>,
    shutdown: CancellationToken,
) -> Result<PageExit> {
    let mut route = page.navigator().subscribe();

    if let Err(e) = page.enter().await {
        warn!("Camera unavailable on entry: {}", e);
    }

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Shutdown requested; leaving capture page");
                page.exit();
                return Ok(PageExit::Shutdown);
            }
            changed = route.changed() => {
                let current = *route.borrow();
                if changed.is_err() || current != Route::CameraCapture {
                    page.exit();
                    return Ok(PageExit::Left(current));
                }
            }
            command = commands.recv() => match command {
                None | Some(PageCommand::Exit) => {
                    page.exit();
                    return Ok(PageExit::Shutdown);
                }
                Some(PageCommand::Cancel) => {
                    page.cancel();
                    return Ok(PageExit::Cancelled);
                }
                Some(PageCommand::Capture) => {
                    if !page.is_ready() {
                        info!("Camera not ready; retrying acquisition");
                        if let Err(e) = page.retry_camera().await {
                            warn!("Camera retry failed: {}", e);
                        }
                        continue;
                    }

                    if let Some(exit) = capture_once(page, &mut commands, &shutdown).await {
                        return Ok(exit);
                    }
                }
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    None,
    Cancel,
    Exit,
}

async fn capture_once(
    page: &mut CapturePage,
    commands: &mut mpsc::Receiver<PageCommand>,
    shutdown: &CancellationToken,
) -> Option<PageExit> {
    let countdown = page.countdown_token();
    let mut interrupt = Interrupt::None;
    let mut commands_open = true;

    let outcome = {
        let capture = page.capture();
        tokio::pin!(capture);

        loop {
            tokio::select! {
                outcome = &mut capture => break outcome,
                command = commands.recv(), if commands_open => match command {
                    Some(PageCommand::Capture) => debug!("Capture already in progress"),
                    Some(PageCommand::Cancel) => {
                        interrupt = Interrupt::Cancel;
                        countdown.cancel();
                    }
                    Some(PageCommand::Exit) => {
                        interrupt = Interrupt::Exit;
                        countdown.cancel();
                    }
                    // Input closed; let the attempt finish
                    None => commands_open = false,
                },
                _ = shutdown.cancelled(), if interrupt != Interrupt::Exit => {
                    interrupt = Interrupt::Exit;
                    countdown.cancel();
                }
            }
        }
    };

    match outcome {
        CaptureOutcome::Navigated(context) => Some(PageExit::Verified(context)),
        CaptureOutcome::Abandoned => Some(PageExit::Left(page.navigator().current())),
        other => {
            debug!("Capture attempt ended: {:?}", other);
            match interrupt {
                Interrupt::Cancel => {
                    page.cancel();
                    Some(PageExit::Cancelled)
                }
                Interrupt::Exit => {
                    page.exit();
                    Some(PageExit::Shutdown)
                }
                Interrupt::None => None,
            }
        }
    }
}
