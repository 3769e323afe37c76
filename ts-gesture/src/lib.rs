//! This crate provides the hand-gesture input capability.
//!
//! Gesture input is strictly best-effort: a [`GestureSource`] is started exactly once per
//! session, and if that fails the error is logged and the scene simply runs without gesture
//! control. Once started, a source delivers [`GestureEvent`]s over a channel at its own cadence,
//! decoupled from the render frame rate; the render loop drains the channel once per frame and
//! applies the events through the scene composer.
//!
//! The recognition backend is a capability, not a concrete class: anything implementing
//! [`HandClassifier`] can sit behind [`CameraGestureSource`], from the bundled luma heuristic to
//! a real landmark model.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle,
};
use thiserror::Error;
use tracing::{debug, warn};

mod camera;
mod classifier;

pub use self::{
    camera::CameraGestureSource,
    classifier::{ClassifyError, HandClassifier, HandReading, LumaBlobClassifier},
};

/// The hand pose categories the scene cares about.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HandPose {
    /// An open hand; scatters the tree.
    OpenPalm,

    /// A closed fist; reassembles the tree.
    ClosedFist,

    /// Any other recognized category; ignored downstream.
    Other,
}

impl HandPose {
    /// Map a recognizer category name to a pose. Only `"Open_Palm"` and `"Closed_Fist"` are
    /// meaningful; everything else is [`Other`](HandPose::Other).
    ///
    /// The bundled [`LumaBlobClassifier`] builds poses directly; this mapping is the entry point
    /// for [`HandClassifier`] backends wrapping a recognizer that reports category names.
    pub fn from_category_name(name: &str) -> Self {
        match name {
            "Open_Palm" => Self::OpenPalm,
            "Closed_Fist" => Self::ClosedFist,
            _ => Self::Other,
        }
    }
}

/// An event delivered by a gesture source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    /// A hand pose was recognized. Sources may deliver the same pose repeatedly; deduplication is
    /// the composer's job.
    Pose(HandPose),

    /// A hand was detected at the given offset from the frame centre, with both components in
    /// [-1, 1].
    HandMoved {
        /// The horizontal offset; -1 is the left edge of the frame.
        x: f32,

        /// The vertical offset; -1 is the top edge of the frame.
        y: f32,
    },
}

/// Convert a wrist position in normalized frame coordinates ([0, 1] with the origin at the top
/// left) into a centred offset in [-1, 1].
pub fn hand_offset(wrist: (f32, f32)) -> (f32, f32) {
    ((wrist.0 - 0.5) * 2., (wrist.1 - 0.5) * 2.)
}

/// An error in starting a gesture source. None of these are fatal: the caller logs the error and
/// the scene runs without gesture input.
#[derive(Debug, Error)]
pub enum GestureInitError {
    /// Enumerating the cameras on this device failed outright.
    #[error("failed to query the available cameras: {0}")]
    CameraQuery(String),

    /// No usable camera was found on this device.
    #[error("no usable camera found on this device")]
    NoCamera,

    /// The camera was found but its stream could not be opened.
    #[error("failed to open the camera stream: {0}")]
    CameraStream(String),
}

/// Something that can be started once to produce a stream of gesture events.
pub trait GestureSource {
    /// Start the source, acquiring whatever resources it needs.
    ///
    /// This is attempted exactly once per session; on failure the error is logged by the caller
    /// and gesture input stays unavailable until the next session.
    fn start(self) -> Result<GestureStream, GestureInitError>;
}

/// A running gesture source: a receiver of events plus the handle of the worker producing them.
///
/// The camera stream behind the worker is a scoped resource: dropping the stream signals the
/// worker to stop, and the worker releases the camera on every exit path.
pub struct GestureStream {
    /// The receiving end of the event channel.
    rx: flume::Receiver<GestureEvent>,

    /// Set to ask the worker to stop.
    stop: Arc<AtomicBool>,

    /// The worker thread, if one is running.
    handle: Option<JoinHandle<()>>,
}

impl GestureStream {
    /// Create a stream from the parts a worker needs. Used by [`CameraGestureSource`] and by
    /// tests that feed the channel by hand.
    pub fn from_parts(
        rx: flume::Receiver<GestureEvent>,
        stop: Arc<AtomicBool>,
        handle: Option<JoinHandle<()>>,
    ) -> Self {
        Self { rx, stop, handle }
    }

    /// Drain every event currently queued, without blocking.
    pub fn drain(&self) -> impl Iterator<Item = GestureEvent> + '_ {
        self.rx.try_iter()
    }
}

impl Drop for GestureStream {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);

        if let Some(handle) = self.handle.take() {
            debug!("Waiting for the gesture worker to release the camera");
            if handle.join().is_err() {
                warn!("The gesture worker panicked; the camera may not have been released");
            }
        }
    }
}
