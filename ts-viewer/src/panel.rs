//! This module renders the egui control panel.

use crate::{Blessing, Composer};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContext};
use rand::thread_rng;
use strum::IntoEnumIterator;
use ts_scene::{random_blessing, OrnamentColour};

/// The vertical spacing between sections of the panel.
const UI_SPACING: f32 = 10.;

/// Render the control panel, along with the current blessing if one is showing.
pub(crate) fn render_gui(
    mut ctx: ResMut<EguiContext>,
    mut composer: ResMut<Composer>,
    mut blessing: ResMut<Blessing>,
) {
    let ctx = ctx.ctx_mut();

    egui::Window::new("Controls").show(ctx, |ui| {
        ui.label(egui::RichText::new("Tinsel Storm").heading());
        let mut config_changed = false;

        let scatter_label = if composer.0.config().scattered {
            "Assemble the tree"
        } else {
            "Unleash the storm"
        };
        if ui.button(scatter_label).clicked() {
            composer.0.toggle_scattered();
            config_changed = true;
        }

        ui.add_space(UI_SPACING);

        ui.label("Ornament colour");
        ui.horizontal(|ui| {
            for colour in OrnamentColour::iter() {
                config_changed |= ui
                    .selectable_value(
                        &mut composer.0.config_mut().ornament_colour,
                        colour,
                        colour.to_string(),
                    )
                    .changed();
            }
        });

        ui.add_space(UI_SPACING);

        config_changed |= ui
            .checkbox(&mut composer.0.config_mut().rotate, "Rotate the tree?")
            .changed();
        config_changed |= ui
            .checkbox(&mut composer.0.config_mut().show_snow, "Show the snow?")
            .changed();

        config_changed |= ui
            .add(
                egui::Slider::new(&mut composer.0.config_mut().bloom_intensity, 0.0..=3.0)
                    .text("Bloom intensity"),
            )
            .changed();

        ui.horizontal(|ui| {
            config_changed |= ui
                .color_edit_button_srgb(&mut composer.0.config_mut().light_colour)
                .changed();
            ui.label("Key light colour");
        });

        ui.add_space(UI_SPACING);

        if ui.button("Random blessing").clicked() {
            blessing.0 = Some(random_blessing(&mut thread_rng()));
        }

        if config_changed {
            composer.0.config().save_to_file();
        }
    });

    if let Some(text) = blessing.0 {
        egui::Window::new("A blessing for you")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(text).italics());
                if ui.button("Close").clicked() {
                    blessing.0 = None;
                }
            });
    }
}
