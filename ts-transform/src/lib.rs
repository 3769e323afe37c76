//! This crate provides the [`Transform`] type used by every particle group, along with the
//! [`InstanceBuffer`] that batches per-particle transforms for upload to the renderer.

use glam::{Quat, Vec3};

mod buffer;

pub use self::buffer::InstanceBuffer;

/// The pose of a single particle: position, orientation, and scale.
///
/// A layout is a `Vec<Transform>` that never changes once generated. The live pose of a particle
/// is also a `Transform`, recomputed every frame by interpolating toward one of the two layouts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// The position of the particle.
    pub position: Vec3,

    /// The orientation of the particle.
    pub rotation: Quat,

    /// The per-axis scale of the particle.
    pub scale: Vec3,
}

impl Transform {
    /// The identity transform: at the origin, unrotated, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform at the given position, unrotated, with unit scale.
    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Move this transform a fraction `f` of the way toward the target.
    ///
    /// The position is lerped and the rotation is slerped. The scale is left alone: the group
    /// animator always writes the assembled layout's scale into the instance buffer, so particle
    /// scale snaps rather than interpolating.
    pub fn step_towards(&mut self, target: &Self, f: f32) {
        self.position = self.position.lerp(target.position, f);
        self.rotation = self.rotation.slerp(target.rotation, f);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Compute the per-frame interpolation fraction for the given convergence speed and time delta.
///
/// The product is clamped to `[0, 1]` so that a frame hitch with a huge `dt` can never overshoot
/// the target.
#[inline]
pub fn interp_factor(speed: f32, dt: f32) -> f32 {
    (speed * dt).clamp(0., 1.)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn interp_factor_is_clamped() {
        assert!(approx_eq!(f32, interp_factor(2.0, 1. / 60.), 2.0 / 60.));
        assert_eq!(interp_factor(2.5, 10.), 1.);
        assert_eq!(interp_factor(2.5, -1.), 0.);
    }

    #[test]
    fn step_towards_leaves_scale_alone() {
        let mut live = Transform {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(0.5),
        };
        let target = Transform {
            position: Vec3::new(10., 0., 0.),
            rotation: Quat::from_rotation_y(1.2),
            scale: Vec3::splat(2.),
        };

        live.step_towards(&target, 0.5);

        assert!(approx_eq!(f32, live.position.x, 5.));
        assert_eq!(live.scale, Vec3::splat(0.5));
    }

    #[test]
    fn step_towards_with_full_fraction_reaches_target() {
        let mut live = Transform::from_position(Vec3::new(-3., 2., 8.));
        let target = Transform::from_position(Vec3::new(1., 1., 1.));

        live.step_towards(&target, 1.);

        assert!(live.position.abs_diff_eq(target.position, 1e-6));
    }
}
