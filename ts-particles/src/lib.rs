//! This crate provides [`ParticleGroup`], the per-frame animator that moves every particle of a
//! group toward whichever layout is currently selected, and the concrete group presets for the
//! scene.

use glam::Quat;
use thiserror::Error;
use ts_transform::{interp_factor, InstanceBuffer, Transform};

mod groups;

pub use self::groups::{gift_palette_indices, gifts, ornaments, tree_particles, GIFT_PALETTE};

/// An error in assembling a particle group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GroupError {
    /// The two layouts have different lengths, so per-particle identity is broken.
    #[error("assembled layout has {assembled} particles but scattered layout has {scattered}")]
    LayoutLengthMismatch {
        /// The length of the assembled layout.
        assembled: usize,

        /// The length of the scattered layout.
        scattered: usize,
    },
}

/// The animator constants of a particle group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatorParams {
    /// The convergence speed; the interpolation fraction per frame is `(speed * dt).clamp(0, 1)`.
    pub speed: f32,

    /// The amplitude of the vertical bob applied in the scattered state.
    pub bob_amplitude: f32,

    /// The frequency of the vertical bob, in radians per second of elapsed time.
    pub bob_frequency: f32,

    /// The rate of the slow self-rotation applied in the scattered state, in radians per second.
    pub spin_rate: f32,
}

/// A fixed-count batch of visually identical decorative instances animated together.
///
/// The two layouts are generated once and never mutated; `live` is recomputed every frame by
/// [`update`](ParticleGroup::update). All three arrays always have the same length.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleGroup {
    /// The tree-shaped arrangement.
    assembled: Vec<Transform>,

    /// The dispersed spherical arrangement.
    scattered: Vec<Transform>,

    /// The currently rendered pose of every particle.
    live: Vec<Transform>,

    /// The animator constants for this group.
    params: AnimatorParams,
}

impl ParticleGroup {
    /// Create a group from its two layouts. The live poses start at the assembled layout, so a
    /// fresh scene is assembled by default.
    pub fn new(
        assembled: Vec<Transform>,
        scattered: Vec<Transform>,
        params: AnimatorParams,
    ) -> Result<Self, GroupError> {
        if assembled.len() != scattered.len() {
            return Err(GroupError::LayoutLengthMismatch {
                assembled: assembled.len(),
                scattered: scattered.len(),
            });
        }

        tracing::debug!(count = assembled.len(), ?params, "Creating particle group");

        Ok(Self {
            live: assembled.clone(),
            assembled,
            scattered,
            params,
        })
    }

    /// The number of particles in this group, fixed for its lifetime.
    pub fn count(&self) -> usize {
        self.assembled.len()
    }

    /// The assembled layout.
    pub fn assembled(&self) -> &[Transform] {
        &self.assembled
    }

    /// The scattered layout.
    pub fn scattered(&self) -> &[Transform] {
        &self.scattered
    }

    /// The live pose of every particle as of the last update.
    pub fn live(&self) -> &[Transform] {
        &self.live
    }

    /// Advance the group by one frame and write the results into the buffer.
    ///
    /// Every particle moves a clamped fraction of the way toward the currently selected layout.
    /// Scale is never interpolated: the written scale is always the assembled layout's, and the
    /// scale multiplier carried by the scattered layouts is not read back during the update. In
    /// the scattered state a small sinusoidal bob and a slow
    /// self-rotation are layered on top of the interpolated pose; both are cosmetic and do not
    /// feed back into the live pose.
    pub fn update(&mut self, dt: f32, elapsed: f32, scattered: bool, buffer: &mut InstanceBuffer) {
        debug_assert_eq!(
            self.live.len(),
            buffer.len(),
            "the instance buffer must have one slot per particle"
        );

        let f = interp_factor(self.params.speed, dt);

        for (i, live) in self.live.iter_mut().enumerate() {
            let target = if scattered {
                &self.scattered[i]
            } else {
                &self.assembled[i]
            };

            live.step_towards(target, f);

            let mut written = Transform {
                position: live.position,
                rotation: live.rotation,
                scale: self.assembled[i].scale,
            };

            if scattered {
                written.position.y += f32::sin(elapsed * self.params.bob_frequency + i as f32)
                    * self.params.bob_amplitude;
                written.rotation =
                    Quat::from_rotation_x(self.params.spin_rate * elapsed) * written.rotation;
            }

            buffer.set(i, written);
        }

        buffer.mark_dirty();
    }
}
