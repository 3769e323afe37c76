//! This module defines the three concrete particle groups of the scene with the layout and
//! animator constants tuned for the small tree.

use crate::{AnimatorParams, GroupError, ParticleGroup};
use rand::Rng;
use std::f32::consts::PI;
use ts_layout::{
    conical_spiral, layered_cone, scatter_sphere, ConicalSpiralParams, LayeredConeParams,
    ScatterParams,
};

/// The four gift wrap colours: red, green, gold, white.
pub const GIFT_PALETTE: [[u8; 3]; 4] = [
    [0xD3, 0x2F, 0x2F],
    [0x38, 0x8E, 0x3C],
    [0xFB, 0xC0, 0x2D],
    [0xFF, 0xFF, 0xFF],
];

/// The scatter sphere shared by the hanging groups.
const HANGING_SCATTER: ScatterParams = ScatterParams {
    min_radius: 5.,
    radius_span: 3.,
    lift: 3.,
    scale_multiplier: 1.2,
};

/// Build the tree's own particle group: a solid-looking cone of roughly `count` tumbling shards.
///
/// The layered generator partitions the requested count evenly across its layers, so the actual
/// count can be slightly lower; the group takes its count from the generated layout.
pub fn tree_particles(count: usize, rng: &mut impl Rng) -> Result<ParticleGroup, GroupError> {
    let assembled = layered_cone(
        count,
        &LayeredConeParams {
            layers: 7,
            layer_spacing: 0.75,
            apex_radius: 0.2,
            radius_step: 0.45,
            vertical_jitter: 1.0,
            scale_min: 0.4,
            scale_max: 0.8,
        },
        rng,
    );

    let scattered = scatter_sphere(
        &ScatterParams {
            min_radius: 0.,
            radius_span: 6.,
            lift: 3.,
            scale_multiplier: 1.,
        },
        &assembled,
        rng,
    );

    ParticleGroup::new(
        assembled,
        scattered,
        AnimatorParams {
            speed: 2.5,
            bob_amplitude: 0.002,
            bob_frequency: 1.0,
            spin_rate: 0.06,
        },
    )
}

/// Build the ornament group: `count` baubles on a tight spiral down the cone surface.
pub fn ornaments(count: usize, rng: &mut impl Rng) -> Result<ParticleGroup, GroupError> {
    let assembled = conical_spiral(
        count,
        &ConicalSpiralParams {
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
        },
        rng,
    );

    let scattered = scatter_sphere(&HANGING_SCATTER, &assembled, rng);

    ParticleGroup::new(
        assembled,
        scattered,
        AnimatorParams {
            speed: 2.0,
            bob_amplitude: 0.005,
            bob_frequency: 3.0,
            spin_rate: 0.5,
        },
    )
}

/// Build the gift group: `count` boxes on a wider spiral, interleaved half a turn behind the
/// ornaments.
pub fn gifts(count: usize, rng: &mut impl Rng) -> Result<ParticleGroup, GroupError> {
    let assembled = conical_spiral(
        count,
        &ConicalSpiralParams {
            top_height: 5.0,
            bottom_height: 0.5,
            turns: 4.,
            angle_offset: PI,
            apex_radius: 0.2,
            radius_growth: 2.5,
            cone_height: 5.25,
            surface_offset: 0.1,
            scale_min: 0.2,
            scale_max: 0.3,
            tilt_jitter: 0.2,
        },
        rng,
    );

    let scattered = scatter_sphere(
        &ScatterParams {
            scale_multiplier: 1.1,
            ..HANGING_SCATTER
        },
        &assembled,
        rng,
    );

    ParticleGroup::new(
        assembled,
        scattered,
        AnimatorParams {
            speed: 2.0,
            bob_amplitude: 0.003,
            bob_frequency: 2.0,
            spin_rate: 1.0,
        },
    )
}

/// Pick a palette index for each gift so the wrap colours vary per box.
pub fn gift_palette_indices(count: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..count).map(|_| rng.gen_range(0..GIFT_PALETTE.len())).collect()
}
