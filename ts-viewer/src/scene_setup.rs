//! This module handles setting up the Bevy world for the scene.

use crate::{Composer, GiftColours, Groups};
use bevy::{core_pipeline::bloom::BloomSettings, prelude::*};
use rand::{thread_rng, Rng};
use smooth_bevy_cameras::controllers::orbit::{OrbitCameraBundle, OrbitCameraController};
use std::f32::consts::TAU;
use ts_particles::GIFT_PALETTE;
use ts_transform::Transform as Pose;

/// Which particle group an entity belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum GroupKind {
    Tree,
    Ornament,
    Gift,
}

/// A Bevy component tying an entity to a slot in one of the instance buffers.
#[derive(Component, Clone, Copy, Debug)]
pub(crate) struct ParticleSlot {
    pub(crate) group: GroupKind,
    pub(crate) index: usize,
}

/// The parent entity of all tree particles; rotates as one.
#[derive(Component, Debug)]
pub(crate) struct TreeGroup;

/// The trunk capsule inside the tree.
#[derive(Component, Debug)]
pub(crate) struct Trunk;

/// The star above the tree.
#[derive(Component, Debug)]
pub(crate) struct Star;

/// A falling snowflake.
#[derive(Component, Debug)]
pub(crate) struct Snowflake {
    pub(crate) speed: f32,
    pub(crate) drift_phase: f32,
}

/// A twinkling mote of light hovering around the tree.
#[derive(Component, Debug)]
pub(crate) struct Twinkle {
    pub(crate) phase: f32,
    pub(crate) base_scale: f32,
}

/// The shared material of all ornaments, retinted when the panel changes colour.
#[derive(Resource)]
pub(crate) struct OrnamentMaterial(pub(crate) Handle<StandardMaterial>);

/// The shared material of the twinkle motes, tinted to match the ornaments.
#[derive(Resource)]
pub(crate) struct SparkleMaterial(pub(crate) Handle<StandardMaterial>);

/// Setup the Bevy world with a camera, floor, and lights.
pub(crate) fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    composer: Res<Composer>,
) {
    let config = composer.0.config();

    commands
        .spawn((
            Camera3dBundle {
                camera: Camera {
                    hdr: true,
                    ..default()
                },
                ..default()
            },
            BloomSettings {
                intensity: config.bloom_intensity,
                threshold: 0.6,
                ..default()
            },
        ))
        .insert(OrbitCameraBundle::new(
            OrbitCameraController {
                mouse_rotate_sensitivity: Vec2::splat(0.25),
                smoothing_weight: 0.1,
                ..default()
            },
            Vec3::new(0., 4., 20.),
            Vec3::new(0., 2.5, 0.),
            Vec3::Y,
        ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 0.5,
    });

    // Key light, colour driven by the panel
    let [r, g, b] = config.light_colour;
    commands.spawn(SpotLightBundle {
        spot_light: SpotLight {
            color: Color::rgb_u8(r, g, b),
            intensity: 30_000.,
            range: 80.,
            outer_angle: 0.3,
            shadows_enabled: true,
            ..default()
        },
        transform: Transform::from_xyz(10., 20., 10.).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });

    // Pink fill from below
    commands.spawn(PointLightBundle {
        point_light: PointLight {
            color: Color::rgb_u8(255, 192, 203),
            intensity: 1500.,
            range: 50.,
            shadows_enabled: false,
            ..default()
        },
        transform: Transform::from_xyz(-10., -10., -10.),
        ..default()
    });

    // Floor
    commands.spawn(PbrBundle {
        mesh: meshes.add(Mesh::from(shape::Plane { size: 1000. })),
        material: materials.add(StandardMaterial {
            base_color: Color::rgb(0.03, 0.05, 0.04),
            perceptual_roughness: 0.3,
            ..default()
        }),
        transform: Transform::from_xyz(0., -2.55, 0.),
        ..default()
    });
}

/// Spawn the tree group, its particles, the snow, and the twinkle motes.
pub(crate) fn spawn_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    groups: Res<Groups>,
    gift_colours: Res<GiftColours>,
    composer: Res<Composer>,
) {
    let config = composer.0.config();

    let shard_mesh = meshes.add(Mesh::from(shape::Icosphere {
        radius: 0.15,
        subdivisions: 0,
    }));
    let shard_material = materials.add(StandardMaterial {
        base_color: Color::rgb_u8(4, 57, 39),
        perceptual_roughness: 0.4,
        ..default()
    });

    let ornament_mesh = meshes.add(Mesh::from(shape::UVSphere {
        sectors: 32,
        stacks: 16,
        radius: 1.,
    }));
    let [or, og, ob] = config.ornament_colour.rgb();
    let ornament_material = materials.add(StandardMaterial {
        base_color: Color::rgb_u8(or, og, ob),
        metallic: 1.,
        perceptual_roughness: 0.15,
        ..default()
    });
    commands.insert_resource(OrnamentMaterial(ornament_material.clone()));

    let gift_mesh = meshes.add(Mesh::from(shape::Cube { size: 1. }));
    let gift_materials: Vec<Handle<StandardMaterial>> = GIFT_PALETTE
        .iter()
        .map(|&[r, g, b]| {
            materials.add(StandardMaterial {
                base_color: Color::rgb_u8(r, g, b),
                perceptual_roughness: 0.5,
                ..default()
            })
        })
        .collect();

    debug!("Spawning tree group");
    commands
        .spawn((
            SpatialBundle::from_transform(Transform::from_xyz(0., -2.5, 0.)),
            TreeGroup,
        ))
        .with_children(|builder| {
            for (index, pose) in groups.tree.assembled().iter().enumerate() {
                builder.spawn((
                    PbrBundle {
                        mesh: shard_mesh.clone(),
                        material: shard_material.clone(),
                        transform: pose_transform(pose),
                        ..default()
                    },
                    ParticleSlot {
                        group: GroupKind::Tree,
                        index,
                    },
                ));
            }

            for (index, pose) in groups.ornaments.assembled().iter().enumerate() {
                builder.spawn((
                    PbrBundle {
                        mesh: ornament_mesh.clone(),
                        material: ornament_material.clone(),
                        transform: pose_transform(pose),
                        ..default()
                    },
                    ParticleSlot {
                        group: GroupKind::Ornament,
                        index,
                    },
                ));
            }

            for (index, pose) in groups.gifts.assembled().iter().enumerate() {
                builder.spawn((
                    PbrBundle {
                        mesh: gift_mesh.clone(),
                        material: gift_materials[gift_colours.0[index]].clone(),
                        transform: pose_transform(pose),
                        ..default()
                    },
                    ParticleSlot {
                        group: GroupKind::Gift,
                        index,
                    },
                ));
            }

            // Trunk
            builder.spawn((
                PbrBundle {
                    mesh: meshes.add(Mesh::from(shape::Capsule {
                        radius: 0.3,
                        rings: 20,
                        depth: 2.,
                        ..default()
                    })),
                    material: materials.add(StandardMaterial {
                        base_color: Color::rgb_u8(61, 40, 23),
                        perceptual_roughness: 0.8,
                        ..default()
                    }),
                    transform: Transform::from_xyz(0., 1., 0.),
                    ..default()
                },
                Trunk,
            ));

            // Star, with its own warm glow
            builder
                .spawn((
                    PbrBundle {
                        mesh: meshes.add(Mesh::from(shape::Icosphere {
                            radius: 0.35,
                            subdivisions: 2,
                        })),
                        material: materials.add(StandardMaterial {
                            base_color: Color::rgb_u8(255, 221, 136),
                            emissive: Color::rgb_linear(4., 3.4, 1.6),
                            perceptual_roughness: 0.1,
                            ..default()
                        }),
                        transform: Transform::from_xyz(0., 5.8, 0.),
                        ..default()
                    },
                    Star,
                ))
                .with_children(|star| {
                    star.spawn(PointLightBundle {
                        point_light: PointLight {
                            color: Color::rgb_u8(255, 170, 0),
                            intensity: 2000.,
                            range: 30.,
                            shadows_enabled: false,
                            ..default()
                        },
                        ..default()
                    });
                });
        });
    debug!("Finished spawning tree group");

    let mut rng = thread_rng();

    // Snow
    let flake_mesh = meshes.add(Mesh::from(shape::UVSphere {
        sectors: 8,
        stacks: 4,
        radius: 0.02,
    }));
    let flake_material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        emissive: Color::rgb_linear(0.8, 0.8, 0.9),
        unlit: true,
        ..default()
    });
    for _ in 0..400 {
        commands.spawn((
            PbrBundle {
                mesh: flake_mesh.clone(),
                material: flake_material.clone(),
                transform: Transform::from_xyz(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-2.5..12.0),
                    rng.gen_range(-10.0..10.0),
                ),
                visibility: Visibility {
                    is_visible: config.show_snow,
                },
                ..default()
            },
            Snowflake {
                speed: rng.gen_range(0.4..1.2),
                drift_phase: rng.gen_range(0.0..TAU),
            },
        ));
    }

    // Twinkle motes, tinted to match the ornaments
    let mote_mesh = meshes.add(Mesh::from(shape::UVSphere {
        sectors: 8,
        stacks: 4,
        radius: 0.04,
    }));
    let mote_material = materials.add(StandardMaterial {
        base_color: Color::rgb_u8(or, og, ob),
        emissive: Color::rgb_u8(or, og, ob).as_rgba_linear() * 2.,
        unlit: true,
        ..default()
    });
    commands.insert_resource(SparkleMaterial(mote_material.clone()));
    for _ in 0..100 {
        let base_scale = rng.gen_range(0.5..1.0);
        commands.spawn((
            PbrBundle {
                mesh: mote_mesh.clone(),
                material: mote_material.clone(),
                transform: Transform::from_xyz(
                    rng.gen_range(-4.0..4.0),
                    rng.gen_range(-1.0..7.0),
                    rng.gen_range(-4.0..4.0),
                )
                .with_scale(Vec3::splat(base_scale)),
                visibility: Visibility {
                    is_visible: config.show_snow,
                },
                ..default()
            },
            Twinkle {
                phase: rng.gen_range(0.0..TAU),
                base_scale,
            },
        ));
    }
}

/// Convert a particle pose into a Bevy transform.
pub(crate) fn pose_transform(pose: &Pose) -> Transform {
    Transform {
        translation: pose.position,
        rotation: pose.rotation,
        scale: pose.scale,
    }
}
