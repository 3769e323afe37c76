//! This module handles the [`SceneComposer`], the single writer of all scene state.

use crate::SceneConfig;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use tracing::{debug, info};
use ts_gesture::HandPose;

/// How fast the tree spins on its own, in radians per second.
const AUTO_ROTATE_RATE: f32 = 0.15;

/// How long after the last hand event gesture control is still considered active, in seconds.
///
/// The activity window is what lets auto-rotation resume once the hand leaves the frame.
const HAND_ACTIVITY_WINDOW: f32 = 1.0;

/// The fraction of the remaining angle covered by each orbit nudge.
const ORBIT_LERP: f32 = 0.1;

/// The lowest allowed polar angle of the orbit camera.
const POLAR_MIN: f32 = FRAC_PI_4;

/// The highest allowed polar angle of the orbit camera.
const POLAR_MAX: f32 = PI / 1.8;

/// The spherical angles of the orbit camera around its target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitAngles {
    /// The azimuthal angle around the vertical axis.
    pub azimuth: f32,

    /// The polar angle down from the vertical axis.
    pub polar: f32,
}

/// The owner of the scene state.
///
/// The control panel mutates the config directly through [`config_mut`](Self::config_mut) (it is
/// the only producer that does), while the gesture bridge goes through [`on_pose`](Self::on_pose)
/// and [`nudge_camera_orbit`](Self::nudge_camera_orbit). The render loop calls
/// [`advance_frame`](Self::advance_frame) once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneComposer {
    /// The shared scene configuration.
    config: SceneConfig,

    /// The current yaw of the tree group.
    yaw: f32,

    /// How much longer gesture control counts as active, in seconds.
    hand_active_for: f32,

    /// How many scatter/assemble transitions have happened. Redundant `set_scattered` calls do
    /// not count.
    transitions: u32,
}

impl SceneComposer {
    /// Create a composer around the given config.
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            yaw: 0.,
            hand_active_for: 0.,
            transitions: 0,
        }
    }

    /// The current scene configuration.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Mutable access to the config for the control panel.
    pub fn config_mut(&mut self) -> &mut SceneConfig {
        &mut self.config
    }

    /// The current yaw of the tree group, in radians.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Whether a hand has been seen recently enough to suppress auto-rotation.
    pub fn hand_control_active(&self) -> bool {
        self.hand_active_for > 0.
    }

    /// The number of scatter/assemble transitions so far.
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    /// Advance per-frame state: decay the hand-activity window and, if auto-rotation is enabled
    /// and no hand is in control, spin the tree. Returns the new yaw.
    pub fn advance_frame(&mut self, dt: f32) -> f32 {
        if self.config.rotate && !self.hand_control_active() {
            self.yaw += dt * AUTO_ROTATE_RATE;
        }

        if self.hand_active_for > 0. {
            self.hand_active_for = (self.hand_active_for - dt).max(0.);
        }

        self.yaw
    }

    /// Set the scatter state, returning whether anything changed. Redundant calls are no-ops.
    pub fn set_scattered(&mut self, scattered: bool) -> bool {
        if self.config.scattered == scattered {
            return false;
        }

        info!(scattered, "Scatter state transition");
        self.config.scattered = scattered;
        self.transitions += 1;
        true
    }

    /// Flip the scatter state and return the new value.
    pub fn toggle_scattered(&mut self) -> bool {
        let scattered = !self.config.scattered;
        self.set_scattered(scattered);
        scattered
    }

    /// Apply a recognized hand pose: an open palm scatters, a closed fist assembles, anything
    /// else is ignored. Returns the new scatter state only when a transition actually happened.
    pub fn on_pose(&mut self, pose: HandPose) -> Option<bool> {
        match pose {
            HandPose::OpenPalm => self.set_scattered(true).then_some(true),
            HandPose::ClosedFist => self.set_scattered(false).then_some(false),
            HandPose::Other => None,
        }
    }

    /// Map a hand offset (both components in [-1, 1]) to new orbit angles, moving a tenth of the
    /// way from `current` toward the angles the hand is pointing at. Marks gesture control
    /// active, which suppresses auto-rotation for a moment.
    pub fn nudge_camera_orbit(&mut self, x: f32, y: f32, current: OrbitAngles) -> OrbitAngles {
        self.hand_active_for = HAND_ACTIVITY_WINDOW;

        let target_azimuth = -x * 2.;
        let target_polar = FRAC_PI_2 + y * 0.5;

        let angles = OrbitAngles {
            azimuth: lerp(current.azimuth, target_azimuth, ORBIT_LERP),
            polar: lerp(current.polar, target_polar, ORBIT_LERP).clamp(POLAR_MIN, POLAR_MAX),
        };
        debug!(x, y, ?angles, "Nudging camera orbit");
        angles
    }
}

/// Linearly interpolate from `a` to `b` by `t`.
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn composer() -> SceneComposer {
        SceneComposer::new(SceneConfig::default())
    }

    #[test]
    fn set_scattered_is_idempotent() {
        let mut composer = composer();

        assert!(composer.set_scattered(true));
        assert!(!composer.set_scattered(true));
        assert_eq!(composer.transitions(), 1);

        assert!(composer.set_scattered(false));
        assert_eq!(composer.transitions(), 2);
    }

    #[test]
    fn repeated_open_palm_is_deduplicated() {
        let mut composer = composer();

        let outcomes: Vec<_> = [
            HandPose::OpenPalm,
            HandPose::OpenPalm,
            HandPose::ClosedFist,
        ]
        .into_iter()
        .map(|pose| composer.on_pose(pose))
        .collect();

        assert_eq!(outcomes, vec![Some(true), None, Some(false)]);
        assert_eq!(composer.transitions(), 2);
    }

    #[test]
    fn other_poses_are_ignored() {
        let mut composer = composer();
        assert_eq!(composer.on_pose(HandPose::Other), None);
        assert_eq!(composer.transitions(), 0);
    }

    #[test]
    fn auto_rotation_advances_the_yaw() {
        let mut composer = composer();
        let yaw = composer.advance_frame(2.);
        assert!(approx_eq!(f32, yaw, 2. * AUTO_ROTATE_RATE));
    }

    #[test]
    fn auto_rotation_is_suppressed_while_a_hand_is_active() {
        let mut composer = composer();
        let start = OrbitAngles {
            azimuth: 0.,
            polar: FRAC_PI_2,
        };

        composer.nudge_camera_orbit(0.5, 0., start);
        assert!(composer.hand_control_active());

        let yaw = composer.advance_frame(0.5);
        assert!(approx_eq!(f32, yaw, 0.));

        // After the activity window lapses, rotation resumes
        let yaw = composer.advance_frame(1.);
        assert!(approx_eq!(f32, yaw, 0.));
        let yaw = composer.advance_frame(1.);
        assert!(approx_eq!(f32, yaw, AUTO_ROTATE_RATE));
    }

    #[test]
    fn orbit_nudge_moves_a_tenth_of_the_way() {
        let mut composer = composer();
        let current = OrbitAngles {
            azimuth: 0.,
            polar: FRAC_PI_2,
        };

        let angles = composer.nudge_camera_orbit(1., 0., current);

        // Target azimuth for x = 1 is -2
        assert!(approx_eq!(f32, angles.azimuth, -0.2));
        assert!(approx_eq!(f32, angles.polar, FRAC_PI_2));
    }

    #[test]
    fn orbit_polar_angle_is_clamped() {
        let mut composer = composer();
        let mut angles = OrbitAngles {
            azimuth: 0.,
            polar: FRAC_PI_2,
        };

        // Keep pushing the hand to the bottom of the frame
        for _ in 0..200 {
            angles = composer.nudge_camera_orbit(0., 1., angles);
        }
        assert!(angles.polar <= POLAR_MAX + 1e-5);

        for _ in 0..200 {
            angles = composer.nudge_camera_orbit(0., -1., angles);
        }
        assert!(angles.polar >= POLAR_MIN - 1e-5);
    }

    #[test]
    fn toggle_flips_the_state() {
        let mut composer = composer();
        assert!(composer.toggle_scattered());
        assert!(composer.config().scattered);
        assert!(!composer.toggle_scattered());
        assert!(!composer.config().scattered);
    }
}
