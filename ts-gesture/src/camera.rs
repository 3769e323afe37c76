//! This module handles the webcam-backed gesture source.

use crate::{
    classifier::HandClassifier, hand_offset, GestureEvent, GestureInitError, GestureStream,
};
use image::GrayImage;
use nokhwa::{
    pixel_format::LumaFormat,
    utils::{ApiBackend, RequestedFormat, RequestedFormatType, Resolution},
    Camera,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};
use tracing::{debug, info, instrument, trace, warn};

/// How long to wait after a failed frame grab before trying again, so a dead camera does not spin
/// the worker at full speed.
const FRAME_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Find the best camera on the device. This function should only ever be called once.
#[instrument]
fn find_best_camera() -> Result<Camera, GestureInitError> {
    nokhwa::nokhwa_initialize(|_| {});

    let best_camera = nokhwa::query(ApiBackend::Auto)
        .map_err(|e| GestureInitError::CameraQuery(e.to_string()))?
        .into_iter()
        .filter_map(|camera_info| {
            Camera::new(
                camera_info.index().clone(),
                RequestedFormat::new::<LumaFormat>(RequestedFormatType::AbsoluteHighestResolution),
            )
            .ok()
        })
        .max_by_key(|camera| {
            let Resolution { width_x, height_y } = camera.resolution();
            width_x * height_y
        });

    info!(idx = ?best_camera.as_ref().map(|cam| cam.index()), "Found best camera");
    best_camera.ok_or(GestureInitError::NoCamera)
}

/// A gesture source that captures webcam frames on a background thread and feeds them to a
/// [`HandClassifier`].
///
/// Every successful reading produces a [`GestureEvent::Pose`] and a [`GestureEvent::HandMoved`]
/// on the stream. Frame-level capture or classification failures are logged and swallowed, so a
/// bad frame never disables the feature.
pub struct CameraGestureSource<C: HandClassifier> {
    /// The classifier that turns frames into hand readings.
    classifier: C,
}

impl<C: HandClassifier> CameraGestureSource<C> {
    /// Create a source around the given classifier. Nothing is acquired until
    /// [`start`](crate::GestureSource::start).
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }
}

impl<C: HandClassifier> crate::GestureSource for CameraGestureSource<C> {
    fn start(self) -> Result<GestureStream, GestureInitError> {
        let mut camera = find_best_camera()?;
        camera
            .open_stream()
            .map_err(|e| GestureInitError::CameraStream(e.to_string()))?;

        let (tx, rx) = flume::unbounded();
        let stop = Arc::new(AtomicBool::new(false));

        let handle = thread::Builder::new()
            .name("gesture-capture".to_string())
            .spawn({
                let stop = Arc::clone(&stop);
                let mut classifier = self.classifier;
                move || {
                    let mut frames = || {
                        camera
                            .frame()
                            .and_then(|frame| frame.decode_image::<LumaFormat>())
                            .map_err(|e| e.to_string())
                    };
                    capture_loop(&mut frames, &mut classifier, &tx, &stop);

                    // Release the camera on every exit path
                    if let Err(e) = camera.stop_stream() {
                        warn!(?e, "Error stopping the camera stream");
                    }
                    debug!("Camera stream released");
                }
            })
            .map_err(|e| GestureInitError::CameraStream(e.to_string()))?;

        info!("Gesture capture started");
        Ok(GestureStream::from_parts(rx, stop, Some(handle)))
    }
}

/// Grab, classify, and publish frames until asked to stop or the receiver goes away.
///
/// The frame source is injected so the loop does not care where frames come from. Frame-grab and
/// classifier failures skip the frame and keep the loop alive.
#[instrument(skip_all)]
fn capture_loop(
    frames: &mut dyn FnMut() -> Result<GrayImage, String>,
    classifier: &mut dyn HandClassifier,
    tx: &flume::Sender<GestureEvent>,
    stop: &AtomicBool,
) {
    while !stop.load(Ordering::Relaxed) {
        let image = match frames() {
            Ok(image) => image,
            Err(error) => {
                warn!(%error, "Failed to grab a camera frame");
                thread::sleep(FRAME_ERROR_BACKOFF);
                continue;
            }
        };

        let reading = match classifier.classify(&image) {
            Ok(Some(reading)) => reading,
            Ok(None) => continue,
            Err(e) => {
                trace!(?e, "Classifier rejected the frame");
                continue;
            }
        };

        let (x, y) = hand_offset(reading.wrist);
        let events = [
            GestureEvent::Pose(reading.pose),
            GestureEvent::HandMoved { x, y },
        ];
        if events.into_iter().any(|event| tx.send(event).is_err()) {
            // The stream has been dropped; nobody is listening any more
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classifier::{ClassifyError, HandReading},
        HandPose,
    };
    use std::collections::VecDeque;

    /// A classifier that replays a fixed script of results, then reports no hand.
    struct ScriptedClassifier {
        script: VecDeque<Result<Option<HandReading>, ClassifyError>>,
    }

    impl ScriptedClassifier {
        fn new(
            script: impl IntoIterator<Item = Result<Option<HandReading>, ClassifyError>>,
        ) -> Self {
            Self {
                script: script.into_iter().collect(),
            }
        }
    }

    impl HandClassifier for ScriptedClassifier {
        fn classify(&mut self, _: &GrayImage) -> Result<Option<HandReading>, ClassifyError> {
            self.script.pop_front().unwrap_or(Ok(None))
        }
    }

    /// Run the capture loop over `frames` scripted frame results, stopping afterwards.
    fn run_loop(
        frames: Vec<Result<(), String>>,
        classifier: &mut ScriptedClassifier,
    ) -> Vec<GestureEvent> {
        let (tx, rx) = flume::unbounded();
        let stop = AtomicBool::new(false);

        let mut remaining = VecDeque::from(frames);
        let mut next_frame = || match remaining.pop_front() {
            Some(Ok(())) => Ok(GrayImage::new(4, 4)),
            Some(Err(e)) => Err(e),
            None => {
                stop.store(true, Ordering::Relaxed);
                Err("out of frames".to_string())
            }
        };

        capture_loop(&mut next_frame, classifier, &tx, &stop);
        rx.try_iter().collect()
    }

    fn reading(pose: HandPose, wrist: (f32, f32)) -> Result<Option<HandReading>, ClassifyError> {
        Ok(Some(HandReading { pose, wrist }))
    }

    #[test]
    fn classifier_errors_do_not_kill_the_loop() {
        let mut classifier = ScriptedClassifier::new([
            Err(ClassifyError::EmptyFrame),
            reading(HandPose::OpenPalm, (0.5, 0.5)),
            Err(ClassifyError::EmptyFrame),
            reading(HandPose::ClosedFist, (0.5, 0.5)),
        ]);

        let events = run_loop(vec![Ok(()); 4], &mut classifier);

        assert_eq!(
            events,
            vec![
                GestureEvent::Pose(HandPose::OpenPalm),
                GestureEvent::HandMoved { x: 0., y: 0. },
                GestureEvent::Pose(HandPose::ClosedFist),
                GestureEvent::HandMoved { x: 0., y: 0. },
            ]
        );
    }

    #[test]
    fn frame_grab_errors_do_not_kill_the_loop() {
        let mut classifier = ScriptedClassifier::new([reading(HandPose::OpenPalm, (0.75, 0.25))]);

        let events = run_loop(
            vec![Err("device disconnected".to_string()), Ok(())],
            &mut classifier,
        );

        assert_eq!(
            events,
            vec![
                GestureEvent::Pose(HandPose::OpenPalm),
                GestureEvent::HandMoved { x: 0.5, y: -0.5 },
            ]
        );
    }

    #[test]
    fn frames_with_no_hand_produce_no_events() {
        let mut classifier = ScriptedClassifier::new([Ok(None), Ok(None)]);
        let events = run_loop(vec![Ok(()); 2], &mut classifier);
        assert!(events.is_empty());
    }
}
