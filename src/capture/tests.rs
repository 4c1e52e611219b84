use super::*;
use crate::camera::{CameraSession, StreamRequest, SyntheticCamera};
use crate::config::{CaptureConfig, FacingMode};
use crate::events::{CaptureEvent, EventBus};
use crate::frame::{FrameData, FrameFormat};
use crate::routes::{Navigator, Route};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

fn create_test_capture_config() -> CaptureConfig {
    CaptureConfig {
        countdown_seconds: 3,
        tick_millis: 10,
        jpeg_quality: 80,
    }
}

fn create_session(camera: &SyntheticCamera, navigator: &Navigator, bus: Arc<EventBus>) -> CameraSession {
    CameraSession::new(
        Arc::new(camera.clone()),
        StreamRequest {
            index: 0,
            facing_mode: FacingMode::User,
            resolution: (32, 24),
            fps: 30,
        },
        navigator.subscribe(),
        bus,
    )
}

#[tokio::test]
async fn test_countdown_captures_and_releases() {
    let camera = SyntheticCamera::new();
    let navigator = Navigator::new(Route::CameraCapture);
    let bus = Arc::new(EventBus::new(32));
    let mut events = bus.subscribe();
    let mut session = create_session(&camera, &navigator, Arc::clone(&bus));
    let mut sequencer = CaptureSequencer::new(create_test_capture_config(), Arc::clone(&bus));

    session.acquire().await.unwrap();
    assert!(sequencer.start(&session));
    assert_eq!(sequencer.countdown(), Some(3));

    let outcome = sequencer.run_countdown(&mut session).await.unwrap();

    let frame = match outcome {
        CountdownOutcome::Captured(frame) => frame,
        other => panic!("Expected a captured frame, got {:?}", other),
    };
    assert_eq!((frame.width, frame.height), (32, 24));
    assert_eq!(sequencer.state(), &SequencerState::Captured);
    assert!(!session.is_ready());
    assert_eq!(camera.active_streams(), 0);

    let jpeg = STANDARD.decode(&frame.image_base64).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    let mut ticks = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CaptureEvent::CountdownTick { remaining } = event {
            ticks.push(remaining);
        }
    }
    assert_eq!(ticks, vec![3, 2, 1, 0]);
}

#[tokio::test]
async fn test_start_requires_ready_camera() {
    let camera = SyntheticCamera::new();
    let navigator = Navigator::new(Route::CameraCapture);
    let bus = Arc::new(EventBus::new(8));
    let session = create_session(&camera, &navigator, Arc::clone(&bus));
    let mut sequencer = CaptureSequencer::new(create_test_capture_config(), bus);

    assert!(!sequencer.start(&session));
    assert_eq!(sequencer.state(), &SequencerState::Idle);
}

#[tokio::test]
async fn test_start_ignored_while_counting() {
    let camera = SyntheticCamera::new();
    let navigator = Navigator::new(Route::CameraCapture);
    let bus = Arc::new(EventBus::new(8));
    let mut session = create_session(&camera, &navigator, Arc::clone(&bus));
    let mut sequencer = CaptureSequencer::new(create_test_capture_config(), bus);

    session.acquire().await.unwrap();
    assert!(sequencer.start(&session));
    assert!(!sequencer.start(&session));
    assert_eq!(sequencer.countdown(), Some(3));
}

#[tokio::test]
async fn test_cancel_token_stops_countdown() {
    let camera = SyntheticCamera::new();
    let navigator = Navigator::new(Route::CameraCapture);
    let bus = Arc::new(EventBus::new(8));
    let mut session = create_session(&camera, &navigator, Arc::clone(&bus));
    let mut config = create_test_capture_config();
    config.tick_millis = 200;
    let mut sequencer = CaptureSequencer::new(config, bus);

    session.acquire().await.unwrap();
    sequencer.start(&session);

    let token = sequencer.countdown_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let outcome = sequencer.run_countdown(&mut session).await.unwrap();

    assert_eq!(outcome, CountdownOutcome::Cancelled);
    assert_eq!(sequencer.state(), &SequencerState::Idle);
    // Camera stays up for the next attempt
    assert!(session.is_ready());
    assert!(!sequencer.countdown_token().is_cancelled());
}

#[tokio::test]
async fn test_navigation_abandons_countdown() {
    let camera = SyntheticCamera::new();
    let navigator = Arc::new(Navigator::new(Route::CameraCapture));
    let bus = Arc::new(EventBus::new(8));
    let mut session = create_session(&camera, &navigator, Arc::clone(&bus));
    let mut config = create_test_capture_config();
    config.tick_millis = 200;
    let mut sequencer = CaptureSequencer::new(config, bus);

    session.acquire().await.unwrap();
    sequencer.start(&session);

    let nav = Arc::clone(&navigator);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        nav.navigate(Route::Settings, None);
    });

    let outcome = sequencer.run_countdown(&mut session).await.unwrap();

    assert_eq!(outcome, CountdownOutcome::Abandoned);
    assert_eq!(sequencer.state(), &SequencerState::Idle);
    assert_eq!(camera.active_streams(), 0);
}

#[tokio::test]
async fn test_extract_without_stream_is_silent() {
    let camera = SyntheticCamera::new();
    let navigator = Navigator::new(Route::CameraCapture);
    let bus = Arc::new(EventBus::new(8));
    let mut session = create_session(&camera, &navigator, Arc::clone(&bus));
    let sequencer = CaptureSequencer::new(create_test_capture_config(), bus);

    assert_eq!(sequencer.extract(&mut session), Ok(None));
}

#[tokio::test]
async fn test_fail_and_reset() {
    let bus = Arc::new(EventBus::new(8));
    let mut sequencer = CaptureSequencer::new(create_test_capture_config(), bus);

    sequencer.fail("Failed to process. Please try again.");
    assert_eq!(
        sequencer.state(),
        &SequencerState::Error("Failed to process. Please try again.".to_string())
    );

    sequencer.reset();
    assert_eq!(sequencer.state(), &SequencerState::Idle);
}

#[test]
fn test_encode_rgb_frame() {
    let frame = FrameData::new(7, SystemTime::now(), vec![128; 8 * 8 * 3], 8, 8, FrameFormat::Rgb24);

    let captured = encode_frame(&frame, 80).unwrap();

    assert_eq!((captured.width, captured.height), (8, 8));
    let jpeg = STANDARD.decode(&captured.image_base64).unwrap();
    let decoded = image::load_from_memory(&jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (8, 8));
}

#[test]
fn test_encode_reencodes_mjpeg() {
    let source = FrameData::new(1, SystemTime::now(), vec![200; 16 * 16 * 3], 16, 16, FrameFormat::Rgb24);
    let jpeg = STANDARD
        .decode(encode_frame(&source, 95).unwrap().image_base64)
        .unwrap();
    let mjpeg = FrameData::new(2, SystemTime::now(), jpeg, 16, 16, FrameFormat::Mjpeg);

    let captured = encode_frame(&mjpeg, 80).unwrap();

    assert_eq!((captured.width, captured.height), (16, 16));
}

#[test]
fn test_encode_mjpeg_uses_decoded_dimensions() {
    let source = FrameData::new(1, SystemTime::now(), vec![90; 4 * 4 * 3], 4, 4, FrameFormat::Rgb24);
    let jpeg = STANDARD
        .decode(encode_frame(&source, 95).unwrap().image_base64)
        .unwrap();
    // Stream reports the requested size, not the size actually delivered
    let mjpeg = FrameData::new(2, SystemTime::now(), jpeg, 8, 8, FrameFormat::Mjpeg);

    let captured = encode_frame(&mjpeg, 80).unwrap();

    assert_eq!((captured.width, captured.height), (4, 4));
    let reencoded = image::load_from_memory(&STANDARD.decode(&captured.image_base64).unwrap())
        .unwrap();
    assert_eq!((reencoded.width(), reencoded.height()), (4, 4));
}

#[test]
fn test_encode_rejects_truncated_frame() {
    let frame = FrameData::new(3, SystemTime::now(), vec![0; 10], 8, 8, FrameFormat::Rgb24);
    assert!(matches!(
        encode_frame(&frame, 80),
        Err(crate::error::DeviceError::FrameEncoding { .. })
    ));
}
