//! This crate provides the shared scene configuration, the [`SceneComposer`] that owns it, and
//! the blessing messages for the control panel.
//!
//! All mutation of scene state goes through the composer so there is exactly one writer per
//! field: the control panel and the gesture bridge both emit intents, and the composer applies
//! them. That keeps the state container trivially safe to move behind a lock or a channel if the
//! producers ever live on different threads.

mod blessings;
mod composer;
mod config;

pub use self::{
    blessings::{random_blessing, BLESSINGS},
    composer::{OrbitAngles, SceneComposer},
    config::{OrnamentColour, SceneConfig},
};
