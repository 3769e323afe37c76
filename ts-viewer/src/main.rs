//! This crate provides the interactive Tinsel Storm viewer.
//!
//! It drives three particle groups (tree shards, ornaments, gifts) between their assembled and
//! scattered layouts, renders them with Bevy, and reacts to hand gestures from the webcam as well
//! as an egui control panel.

mod animate;
mod panel;
mod scene_setup;

use self::{
    animate::{
        advance_scene, animate_snow, animate_star, animate_trunk, apply_light_settings,
        apply_ornament_colour, drain_gesture_events, flush_particles, rotate_tree_group,
        toggle_snow_layer, twinkle_motes,
    },
    panel::render_gui,
    scene_setup::{setup, spawn_scene},
};
use bevy::{log::LogPlugin, prelude::*, DefaultPlugins};
use bevy_egui::EguiPlugin;
use rand::{rngs::StdRng, SeedableRng};
use smooth_bevy_cameras::{controllers::orbit::OrbitCameraPlugin, LookTransformPlugin};
use tracing::{error, info, warn, Level};
use tracing_unwrap::ResultExt;
use ts_gesture::{CameraGestureSource, GestureSource, GestureStream, LumaBlobClassifier};
use ts_particles::{gift_palette_indices, gifts, ornaments, tree_particles, ParticleGroup};
use ts_scene::{SceneComposer, SceneConfig};
use ts_transform::InstanceBuffer;

/// The number of shards making up the tree's foliage.
const TREE_PARTICLES: usize = 1800;

/// The number of ornaments hanging on the tree.
const ORNAMENT_PARTICLES: usize = 50;

/// The number of gifts spiralling around the base.
const GIFT_PARTICLES: usize = 20;

/// The scene composer, wrapped so Bevy can own it as a resource.
#[derive(Resource)]
pub(crate) struct Composer(pub(crate) SceneComposer);

/// All three particle groups together with their instance buffers.
#[derive(Resource)]
pub(crate) struct Groups {
    pub(crate) tree: ParticleGroup,
    pub(crate) tree_buffer: InstanceBuffer,

    pub(crate) ornaments: ParticleGroup,
    pub(crate) ornament_buffer: InstanceBuffer,

    pub(crate) gifts: ParticleGroup,
    pub(crate) gift_buffer: InstanceBuffer,
}

/// The palette index assigned to each gift when the scene was built.
#[derive(Resource)]
pub(crate) struct GiftColours(pub(crate) Vec<usize>);

/// The gesture stream, if a webcam was available at startup.
#[derive(Resource)]
pub(crate) struct GestureInput(pub(crate) Option<GestureStream>);

/// The blessing currently being displayed, if any.
#[derive(Resource, Default)]
pub(crate) struct Blessing(pub(crate) Option<&'static str>);

/// Start the viewer.
fn main() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = SceneConfig::from_file();
    info!(?config, "Loaded scene config");

    let gesture_stream = match CameraGestureSource::new(LumaBlobClassifier::default()).start() {
        Ok(stream) => Some(stream),
        Err(error) => {
            error!(%error, "Gesture input unavailable; mouse and panel controls still work");
            None
        }
    };

    let mut rng = StdRng::from_entropy();
    let tree = tree_particles(TREE_PARTICLES, &mut rng)
        .expect_or_log("Tree layouts should have matching lengths");
    let ornaments = ornaments(ORNAMENT_PARTICLES, &mut rng)
        .expect_or_log("Ornament layouts should have matching lengths");
    let gifts = gifts(GIFT_PARTICLES, &mut rng)
        .expect_or_log("Gift layouts should have matching lengths");
    let gift_colours = gift_palette_indices(GIFT_PARTICLES, &mut rng);

    let groups = Groups {
        tree_buffer: InstanceBuffer::new(tree.count()),
        tree,
        ornament_buffer: InstanceBuffer::new(ornaments.count()),
        ornaments,
        gift_buffer: InstanceBuffer::new(gifts.count()),
        gifts,
    };

    info!("Starting bevy app");
    App::new()
        .insert_resource(Msaa { samples: 4 })
        .add_plugins(
            DefaultPlugins
                .build()
                .disable::<LogPlugin>()
                .set(WindowPlugin {
                    window: WindowDescriptor {
                        title: "Tinsel Storm".to_string(),
                        ..default()
                    },
                    ..default()
                }),
        )
        .add_plugin(LookTransformPlugin)
        .add_plugin(OrbitCameraPlugin::default())
        .add_plugin(EguiPlugin)
        .insert_resource(Composer(SceneComposer::new(config)))
        .insert_resource(groups)
        .insert_resource(GiftColours(gift_colours))
        .insert_resource(GestureInput(gesture_stream))
        .init_resource::<Blessing>()
        .add_startup_system(setup)
        .add_startup_system(spawn_scene)
        .add_system(drain_gesture_events)
        .add_system(advance_scene)
        .add_system(flush_particles.after(advance_scene))
        .add_system(rotate_tree_group.after(advance_scene))
        .add_system(animate_trunk)
        .add_system(animate_star)
        .add_system(animate_snow)
        .add_system(twinkle_motes)
        .add_system(toggle_snow_layer)
        .add_system(apply_ornament_colour)
        .add_system(apply_light_settings)
        .add_system(render_gui)
        .run();

    // Winit terminates the program after the event loop ends, so we should never get here. If we
    // do, then we want to terminate the program manually.
    warn!(concat!(
        "Winit should terminate the program when the eventloop ends, but it hasn't. ",
        "Now terminating the program."
    ));
    std::process::exit(255);
}
