//! This module handles the persistent scene configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use strum::{Display, EnumIter};

/// The three ornament finishes offered by the control panel.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, Display, EnumIter)]
pub enum OrnamentColour {
    /// Silver (`#C0C0C0`), the default for the pink/black theme.
    Silver,

    /// Gold (`#FFD700`).
    Gold,

    /// Pale pastel pink (`#FFD1DC`).
    #[strum(serialize = "Pink")]
    PalePink,
}

impl OrnamentColour {
    /// The sRGB value of this finish.
    pub const fn rgb(self) -> [u8; 3] {
        match self {
            Self::Silver => [0xC0, 0xC0, 0xC0],
            Self::Gold => [0xFF, 0xD7, 0x00],
            Self::PalePink => [0xFF, 0xD1, 0xDC],
        }
    }
}

/// The shared scene configuration, read every frame by the composer and the particle groups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Whether the particle groups are currently in the scattered state.
    pub scattered: bool,

    /// Whether the tree rotates on its own when no hand is controlling the camera.
    pub rotate: bool,

    /// Whether the snow and sparkle layers are visible.
    pub show_snow: bool,

    /// The finish of the ornament baubles.
    pub ornament_colour: OrnamentColour,

    /// The colour of the main spot light.
    pub light_colour: [u8; 3],

    /// The intensity of the bloom post-processing pass.
    pub bloom_intensity: f32,
}

impl SceneConfig {
    /// Create the default scene configuration.
    pub const fn default() -> Self {
        Self {
            scattered: false,
            rotate: true,
            show_snow: true,
            ornament_colour: OrnamentColour::Silver,
            light_colour: [255, 255, 255],
            bloom_intensity: 1.2,
        }
    }

    /// Return the filename to store the config in.
    const fn config_filename() -> &'static str {
        "config/scene.ron"
    }

    /// Load the config from the file, using the default if the file is unavailable.
    pub fn from_file() -> Self {
        let _ = fs::DirBuilder::new().recursive(true).create("config");

        let write_and_return_default = || -> Self {
            let default = Self::default();
            default.save_to_file();
            default
        };

        let Ok(text) = fs::read_to_string(Self::config_filename()) else {
            return write_and_return_default();
        };

        ron::from_str(&text).unwrap_or_else(|_| write_and_return_default())
    }

    /// Save the config to the file.
    pub fn save_to_file(&self) {
        let _ = fs::write(
            Self::config_filename(),
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default().struct_names(true))
                .expect("The scene config should be serializable"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_ron() {
        let config = SceneConfig {
            scattered: true,
            rotate: false,
            show_snow: false,
            ornament_colour: OrnamentColour::Gold,
            light_colour: [255, 170, 68],
            bloom_intensity: 1.5,
        };

        let text = ron::ser::to_string_pretty(
            &config,
            ron::ser::PrettyConfig::default().struct_names(true),
        )
        .unwrap();
        let parsed: SceneConfig = ron::from_str(&text).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn ornament_colours_have_the_advertised_values() {
        assert_eq!(OrnamentColour::Silver.rgb(), [0xC0, 0xC0, 0xC0]);
        assert_eq!(OrnamentColour::Gold.rgb(), [0xFF, 0xD7, 0x00]);
        assert_eq!(OrnamentColour::PalePink.rgb(), [0xFF, 0xD1, 0xDC]);
    }

    #[test]
    fn pale_pink_displays_as_pink() {
        assert_eq!(OrnamentColour::PalePink.to_string(), "Pink");
    }
}
