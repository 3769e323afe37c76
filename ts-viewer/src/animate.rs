//! This module holds the per-frame systems that drive the scene.

use crate::{
    scene_setup::{
        pose_transform, GroupKind, OrnamentMaterial, ParticleSlot, Snowflake, SparkleMaterial,
        Star, TreeGroup, Trunk, Twinkle,
    },
    Composer, GestureInput, Groups,
};
use bevy::{core_pipeline::bloom::BloomSettings, prelude::*};
use smooth_bevy_cameras::LookTransform;
use ts_gesture::GestureEvent;
use ts_scene::{OrbitAngles, OrnamentColour};
use ts_transform::interp_factor;

/// The resting height of the tree group's origin.
const TREE_BASE_Y: f32 = -2.5;

/// Drain all pending gesture events and apply them through the composer.
pub(crate) fn drain_gesture_events(
    gesture: Res<GestureInput>,
    mut composer: ResMut<Composer>,
    mut cameras: Query<&mut LookTransform>,
) {
    let Some(stream) = &gesture.0 else { return };

    for event in stream.drain() {
        match event {
            GestureEvent::Pose(pose) => {
                composer.0.on_pose(pose);
            }
            GestureEvent::HandMoved { x, y } => {
                let Ok(mut look) = cameras.get_single_mut() else { continue };

                let offset = look.eye - look.target;
                let radius = offset.length();
                if radius <= f32::EPSILON {
                    continue;
                }

                let current = OrbitAngles {
                    azimuth: f32::atan2(offset.x, offset.z),
                    polar: f32::acos((offset.y / radius).clamp(-1., 1.)),
                };
                let next = composer.0.nudge_camera_orbit(x, y, current);

                look.eye = look.target
                    + radius
                        * Vec3::new(
                            next.polar.sin() * next.azimuth.sin(),
                            next.polar.cos(),
                            next.polar.sin() * next.azimuth.cos(),
                        );
            }
        }
    }
}

/// Advance the composer's clock and step every particle group towards its current target layout.
pub(crate) fn advance_scene(
    time: Res<Time>,
    mut composer: ResMut<Composer>,
    mut groups: ResMut<Groups>,
) {
    let dt = time.delta_seconds();
    let elapsed = time.elapsed_seconds();

    composer.0.advance_frame(dt);
    let scattered = composer.0.config().scattered;

    let Groups {
        tree,
        tree_buffer,
        ornaments,
        ornament_buffer,
        gifts,
        gift_buffer,
    } = &mut *groups;

    tree.update(dt, elapsed, scattered, tree_buffer);
    ornaments.update(dt, elapsed, scattered, ornament_buffer);
    gifts.update(dt, elapsed, scattered, gift_buffer);
}

/// Copy dirty instance buffers into the particle entities' transforms.
pub(crate) fn flush_particles(
    mut groups: ResMut<Groups>,
    mut particles: Query<(&ParticleSlot, &mut Transform)>,
) {
    let tree_dirty = groups.tree_buffer.take_dirty();
    let ornament_dirty = groups.ornament_buffer.take_dirty();
    let gift_dirty = groups.gift_buffer.take_dirty();
    if !(tree_dirty || ornament_dirty || gift_dirty) {
        return;
    }

    for (slot, mut transform) in particles.iter_mut() {
        let (dirty, buffer) = match slot.group {
            GroupKind::Tree => (tree_dirty, &groups.tree_buffer),
            GroupKind::Ornament => (ornament_dirty, &groups.ornament_buffer),
            GroupKind::Gift => (gift_dirty, &groups.gift_buffer),
        };
        if dirty {
            *transform = pose_transform(&buffer.transforms()[slot.index]);
        }
    }
}

/// Spin the whole tree group and bob it gently while assembled.
pub(crate) fn rotate_tree_group(
    time: Res<Time>,
    composer: Res<Composer>,
    mut tree: Query<&mut Transform, With<TreeGroup>>,
) {
    let Ok(mut transform) = tree.get_single_mut() else { return };

    transform.rotation = Quat::from_rotation_y(composer.0.yaw());
    transform.translation.y = if composer.0.config().scattered {
        TREE_BASE_Y
    } else {
        TREE_BASE_Y + f32::sin(time.elapsed_seconds() * 2.) * 0.05
    };
}

/// Shrink the trunk away while scattered and grow it back while assembled.
pub(crate) fn animate_trunk(
    time: Res<Time>,
    composer: Res<Composer>,
    mut trunk: Query<&mut Transform, With<Trunk>>,
) {
    let Ok(mut transform) = trunk.get_single_mut() else { return };

    let target = if composer.0.config().scattered {
        // A zero scale degenerates the mesh's normals, so stop just short of it
        Vec3::splat(0.001)
    } else {
        Vec3::ONE
    };
    let f = interp_factor(3., time.delta_seconds());
    transform.scale = transform.scale.lerp(target, f);
}

/// Float the star upwards and shrink it while scattered, spinning all the while.
pub(crate) fn animate_star(
    time: Res<Time>,
    composer: Res<Composer>,
    mut star: Query<&mut Transform, With<Star>>,
) {
    let Ok(mut transform) = star.get_single_mut() else { return };

    let scattered = composer.0.config().scattered;
    let target_position = Vec3::new(0., if scattered { 8. } else { 5.8 }, 0.);
    let target_scale = Vec3::splat(if scattered { 0.1 } else { 1. });

    let f = interp_factor(2., time.delta_seconds());
    transform.translation = transform.translation.lerp(target_position, f);
    transform.scale = transform.scale.lerp(target_scale, f);
    transform.rotate_y(0.8 * time.delta_seconds());
}

/// Let the snow fall, wrapping flakes back to the top once they reach the floor.
pub(crate) fn animate_snow(time: Res<Time>, mut flakes: Query<(&Snowflake, &mut Transform)>) {
    let dt = time.delta_seconds();
    let elapsed = time.elapsed_seconds();

    for (flake, mut transform) in flakes.iter_mut() {
        transform.translation.y -= flake.speed * dt;
        transform.translation.x += f32::sin(elapsed * 0.5 + flake.drift_phase) * 0.2 * dt;
        if transform.translation.y < TREE_BASE_Y {
            transform.translation.y = 12.;
        }
    }
}

/// Pulse the twinkle motes by scaling them up and down.
pub(crate) fn twinkle_motes(time: Res<Time>, mut motes: Query<(&Twinkle, &mut Transform)>) {
    let elapsed = time.elapsed_seconds();

    for (mote, mut transform) in motes.iter_mut() {
        let pulse = 0.6 + 0.4 * f32::sin(elapsed * 2. + mote.phase);
        transform.scale = Vec3::splat(mote.base_scale * pulse);
    }
}

/// Show or hide the snow and twinkle layers to match the config.
pub(crate) fn toggle_snow_layer(
    composer: Res<Composer>,
    mut layers: Query<&mut Visibility, Or<(With<Snowflake>, With<Twinkle>)>>,
) {
    let show = composer.0.config().show_snow;
    for mut visibility in layers.iter_mut() {
        if visibility.is_visible != show {
            visibility.is_visible = show;
        }
    }
}

/// Retint the ornament and twinkle materials when the panel changes colour.
pub(crate) fn apply_ornament_colour(
    composer: Res<Composer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    ornament_material: Res<OrnamentMaterial>,
    sparkle_material: Res<SparkleMaterial>,
    mut last: Local<Option<OrnamentColour>>,
) {
    let colour = composer.0.config().ornament_colour;
    if *last == Some(colour) {
        return;
    }
    *last = Some(colour);

    let [r, g, b] = colour.rgb();
    if let Some(material) = materials.get_mut(&ornament_material.0) {
        material.base_color = Color::rgb_u8(r, g, b);
    }
    if let Some(material) = materials.get_mut(&sparkle_material.0) {
        material.base_color = Color::rgb_u8(r, g, b);
        material.emissive = Color::rgb_u8(r, g, b).as_rgba_linear() * 2.;
    }
}

/// Push the panel's light colour and bloom intensity into the renderer.
pub(crate) fn apply_light_settings(
    composer: Res<Composer>,
    mut spots: Query<&mut SpotLight>,
    mut blooms: Query<&mut BloomSettings>,
) {
    let config = composer.0.config();

    if let Ok(mut spot) = spots.get_single_mut() {
        let [r, g, b] = config.light_colour;
        let colour = Color::rgb_u8(r, g, b);
        if spot.color != colour {
            spot.color = colour;
        }
    }

    if let Ok(mut bloom) = blooms.get_single_mut() {
        if bloom.intensity != config.bloom_intensity {
            bloom.intensity = config.bloom_intensity;
        }
    }
}
