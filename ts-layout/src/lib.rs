//! This crate provides the layout generators for the particle groups.
//!
//! Every group has two layouts of equal length: an *assembled* layout that shapes the group into
//! part of the tree, and a *scattered* layout that disperses it into a sphere around the scene.
//! Index `i` refers to the same logical particle in both layouts, which is what makes stable
//! per-particle interpolation between the two states possible.
//!
//! All generators are pure given an injected [`Rng`], so tests can seed a [`StdRng`] and get
//! reproducible layouts.
//!
//! [`StdRng`]: rand::rngs::StdRng

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;
use std::f32::consts::{PI, TAU};
use ts_transform::Transform;

/// Parameters for the conical spiral layout used by the hanging groups (ornaments and gifts).
///
/// The spiral sweeps `turns` full revolutions while descending from `top_height` to
/// `bottom_height`, sitting `surface_offset` outside the cone surface of the tree foliage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConicalSpiralParams {
    /// The height of the first particle on the spiral.
    pub top_height: f32,

    /// The height of the last particle on the spiral.
    pub bottom_height: f32,

    /// How many full revolutions the spiral makes from top to bottom.
    pub turns: f32,

    /// A constant added to every angle, so two spirals can be interleaved without overlapping.
    pub angle_offset: f32,

    /// The cone radius at the very top of the tree.
    pub apex_radius: f32,

    /// How much the cone radius grows over `cone_height` units of descent.
    pub radius_growth: f32,

    /// The total height of the tree cone that `radius_growth` is measured against.
    pub cone_height: f32,

    /// How far outside the cone surface the particles hang.
    pub surface_offset: f32,

    /// The minimum uniform scale of a particle.
    pub scale_min: f32,

    /// The maximum uniform scale of a particle.
    pub scale_max: f32,

    /// The maximum random tilt (radians) about the x and z axes. Zero means every particle keeps
    /// the identity orientation; non-zero also gives each particle a free random yaw.
    pub tilt_jitter: f32,
}

/// Parameters for the layered conical volume layout used by the tree's own particles.
///
/// The cone is approximated by a stack of horizontal discs: particles are spread area-uniformly
/// across each disc and jittered vertically so the layers blend into a solid volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayeredConeParams {
    /// The number of horizontal layers.
    pub layers: usize,

    /// The vertical distance between adjacent layers. The top layer sits at
    /// `layers * layer_spacing`.
    pub layer_spacing: f32,

    /// The disc radius of the top layer.
    pub apex_radius: f32,

    /// How much the disc radius grows per layer of descent.
    pub radius_step: f32,

    /// The total span of the uniform vertical jitter applied within a layer.
    pub vertical_jitter: f32,

    /// The minimum uniform scale of a particle.
    pub scale_min: f32,

    /// The maximum uniform scale of a particle.
    pub scale_max: f32,
}

/// Parameters for the scattered layout shared by every particle group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterParams {
    /// The minimum distance from the scatter centre.
    pub min_radius: f32,

    /// The span of the random radius; particles land in `[min_radius, min_radius + radius_span]`.
    pub radius_span: f32,

    /// How far above the origin the scatter sphere is centred.
    pub lift: f32,

    /// Multiplier applied to each particle's assembled scale for a bit of visual pop.
    pub scale_multiplier: f32,
}

/// Generate the conical spiral layout.
///
/// Particle `i` is placed at normalised index `t = i / count`: the angle sweeps `t * 2π * turns`,
/// the height descends linearly, and the radius follows the cone surface at that height plus the
/// configured offset.
pub fn conical_spiral(
    count: usize,
    params: &ConicalSpiralParams,
    rng: &mut impl Rng,
) -> Vec<Transform> {
    let mut transforms = Vec::with_capacity(count);

    for i in 0..count {
        let t = i as f32 / count as f32;
        let angle = t * TAU * params.turns + params.angle_offset;
        let height = params.top_height - t * (params.top_height - params.bottom_height);

        let cone_radius = params.apex_radius
            + (params.cone_height - height) / params.cone_height * params.radius_growth;
        let radius = cone_radius + params.surface_offset;

        let rotation = if params.tilt_jitter == 0. {
            Quat::IDENTITY
        } else {
            Quat::from_euler(
                EulerRot::XYZ,
                rng.gen_range(0.0..params.tilt_jitter),
                rng.gen_range(0.0..TAU),
                rng.gen_range(0.0..params.tilt_jitter),
            )
        };

        transforms.push(Transform {
            position: Vec3::new(angle.cos() * radius, height, angle.sin() * radius),
            rotation,
            scale: Vec3::splat(rng.gen_range(params.scale_min..params.scale_max)),
        });
    }

    transforms
}

/// Generate the layered conical volume layout.
///
/// `count` is partitioned evenly across the layers with floor division, so the returned layout
/// can be slightly shorter than requested; callers should take the group count from the returned
/// length.
pub fn layered_cone(
    count: usize,
    params: &LayeredConeParams,
    rng: &mut impl Rng,
) -> Vec<Transform> {
    if params.layers == 0 {
        return Vec::new();
    }

    let per_layer = count / params.layers;
    let mut transforms = Vec::with_capacity(per_layer * params.layers);

    for layer in 0..params.layers {
        let layer_y = (params.layers - layer) as f32 * params.layer_spacing;
        let layer_radius = params.apex_radius + layer as f32 * params.radius_step;

        for _ in 0..per_layer {
            let angle = rng.gen_range(0.0..TAU);
            // sqrt of a uniform sample makes the disc area-uniform rather than centre-heavy
            let radius = rng.gen_range(0.0f32..1.0).sqrt() * layer_radius;
            let y_jitter = (rng.gen_range(0.0f32..1.0) - 0.5) * params.vertical_jitter;

            transforms.push(Transform {
                position: Vec3::new(
                    angle.cos() * radius,
                    layer_y + y_jitter,
                    angle.sin() * radius,
                ),
                rotation: Quat::from_euler(
                    EulerRot::XYZ,
                    rng.gen_range(0.0..PI),
                    rng.gen_range(0.0..PI),
                    rng.gen_range(0.0..PI),
                ),
                scale: Vec3::splat(rng.gen_range(params.scale_min..params.scale_max)),
            });
        }
    }

    transforms
}

/// Generate the scattered layout for a group whose assembled layout is `assembled`.
///
/// Directions are uniform on the unit sphere (`theta ~ U[0, 2π)`, `phi = acos(2u - 1)`) and the
/// radius is `min_radius + U * radius_span`, so particles bias toward the outer shell rather
/// than filling the ball uniformly.
///
/// The scale of scattered particle `i` is the assembled scale of particle `i` times the
/// configured multiplier, preserving per-particle identity between the two layouts.
pub fn scatter_sphere(
    params: &ScatterParams,
    assembled: &[Transform],
    rng: &mut impl Rng,
) -> Vec<Transform> {
    assembled
        .iter()
        .map(|base| {
            let theta = rng.gen_range(0.0..TAU);
            let phi = f32::acos(2. * rng.gen_range(0.0f32..1.0) - 1.);
            let r = params.min_radius + rng.gen_range(0.0f32..1.0) * params.radius_span;

            let position = Vec3::new(
                r * phi.sin() * theta.cos(),
                r * phi.sin() * theta.sin() + params.lift,
                r * phi.cos(),
            );

            Transform {
                position,
                rotation: Quat::from_euler(
                    EulerRot::XYZ,
                    rng.gen_range(0.0..PI),
                    rng.gen_range(0.0..PI),
                    0.,
                ),
                scale: base.scale * params.scale_multiplier,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use glam::Vec3Swizzles;
    use rand::{rngs::StdRng, SeedableRng};

    /// The ornament spiral parameters used by the real scene.
    fn ornament_spiral() -> ConicalSpiralParams {
        ConicalSpiralParams {
            top_height: 5.25,
            bottom_height: 0.5,
            turns: 7.,
            angle_offset: 0.,
            apex_radius: 0.2,
            radius_growth: 2.3,
            cone_height: 5.25,
            surface_offset: 0.1,
            scale_min: 0.12,
            scale_max: 0.24,
            tilt_jitter: 0.,
        }
    }

    fn tree_cone() -> LayeredConeParams {
        LayeredConeParams {
            layers: 7,
            layer_spacing: 0.75,
            apex_radius: 0.2,
            radius_step: 0.45,
            vertical_jitter: 1.0,
            scale_min: 0.4,
            scale_max: 0.8,
        }
    }

    fn scatter() -> ScatterParams {
        ScatterParams {
            min_radius: 5.,
            radius_span: 3.,
            lift: 3.,
            scale_multiplier: 1.2,
        }
    }

    #[test]
    fn spiral_heights_and_radii_are_in_range() {
        let mut rng = StdRng::seed_from_u64(12345);
        let layout = conical_spiral(50, &ornament_spiral(), &mut rng);

        assert_eq!(layout.len(), 50);
        for transform in &layout {
            assert!(
                (0.5..=5.25).contains(&transform.position.y),
                "height {} out of [0.5, 5.25]",
                transform.position.y
            );

            let horizontal = transform.position.xz().length();
            assert!(
                horizontal > 0.,
                "spiral particles must sit strictly off the vertical axis"
            );
        }
    }

    #[test]
    fn spiral_first_particle_is_at_the_top() {
        let mut rng = StdRng::seed_from_u64(12345);
        let layout = conical_spiral(50, &ornament_spiral(), &mut rng);
        assert!(approx_eq!(f32, layout[0].position.y, 5.25));
    }

    #[test]
    fn spiral_with_zero_tilt_keeps_identity_rotation() {
        let mut rng = StdRng::seed_from_u64(12345);
        let layout = conical_spiral(10, &ornament_spiral(), &mut rng);
        assert!(layout.iter().all(|t| t.rotation == Quat::IDENTITY));
    }

    #[test]
    fn layered_cone_partitions_count_evenly() {
        let mut rng = StdRng::seed_from_u64(12345);
        let layout = layered_cone(1800, &tree_cone(), &mut rng);

        // 1800 / 7 = 257 per layer
        assert_eq!(layout.len(), 257 * 7);
    }

    #[test]
    fn layered_cone_positions_stay_inside_their_layers() {
        let params = tree_cone();
        let mut rng = StdRng::seed_from_u64(12345);
        let layout = layered_cone(700, &params, &mut rng);

        let max_radius = params.apex_radius + (params.layers - 1) as f32 * params.radius_step;
        let max_y = params.layers as f32 * params.layer_spacing + params.vertical_jitter / 2.;
        let min_y = params.layer_spacing - params.vertical_jitter / 2.;

        for transform in &layout {
            assert!(transform.position.xz().length() <= max_radius + 1e-4);
            assert!(transform.position.y <= max_y + 1e-4);
            assert!(transform.position.y >= min_y - 1e-4);
        }
    }

    #[test]
    fn scatter_distances_lie_in_the_radius_range() {
        let mut rng = StdRng::seed_from_u64(12345);
        let params = scatter();
        let assembled = conical_spiral(50, &ornament_spiral(), &mut rng);
        let scattered = scatter_sphere(&params, &assembled, &mut rng);

        assert_eq!(scattered.len(), assembled.len());

        let centre = Vec3::new(0., params.lift, 0.);
        for transform in &scattered {
            let distance = (transform.position - centre).length();
            assert!(
                (5.0 - 1e-4..=8.0 + 1e-4).contains(&distance),
                "scatter distance {distance} out of [5, 8]"
            );
        }
    }

    #[test]
    fn scatter_scale_follows_the_same_logical_particle() {
        let mut rng = StdRng::seed_from_u64(12345);
        let assembled = conical_spiral(20, &ornament_spiral(), &mut rng);
        let scattered = scatter_sphere(&scatter(), &assembled, &mut rng);

        for (a, s) in assembled.iter().zip(&scattered) {
            assert!(approx_eq!(f32, s.scale.x, a.scale.x * 1.2));
        }
    }

    #[test]
    fn generators_are_deterministic_for_a_seeded_rng() {
        let first = conical_spiral(30, &ornament_spiral(), &mut StdRng::seed_from_u64(99));
        let second = conical_spiral(30, &ornament_spiral(), &mut StdRng::seed_from_u64(99));
        assert_eq!(first, second);

        let first = layered_cone(140, &tree_cone(), &mut StdRng::seed_from_u64(99));
        let second = layered_cone(140, &tree_cone(), &mut StdRng::seed_from_u64(99));
        assert_eq!(first, second);
    }

    #[test]
    fn zero_count_produces_empty_layouts() {
        let mut rng = StdRng::seed_from_u64(12345);
        assert!(conical_spiral(0, &ornament_spiral(), &mut rng).is_empty());
        assert!(layered_cone(0, &tree_cone(), &mut rng).is_empty());
        assert!(scatter_sphere(&scatter(), &[], &mut rng).is_empty());
    }
}
