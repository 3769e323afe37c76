//! This module handles the blessing messages shown by the control panel.

use rand::Rng;

/// The blessing messages the panel can draw from.
pub const BLESSINGS: [&str; 8] = [
    "May your days be merry and bright.",
    "Wishing you peace, love, and joy this holiday season.",
    "Ho Ho Ho! Happiness is coming your way.",
    "May the magic of Christmas fill your heart.",
    "Sending you warm wishes and holiday cheer.",
    "Sparkle and shine, it's Christmas time!",
    "Joy to the world, and especially to you.",
    "May all your Christmas dreams come true.",
];

/// Pick a blessing uniformly at random.
pub fn random_blessing(rng: &mut impl Rng) -> &'static str {
    BLESSINGS[rng.gen_range(0..BLESSINGS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn blessings_come_from_the_fixed_list() {
        let mut rng = StdRng::seed_from_u64(12345);
        for _ in 0..100 {
            let blessing = random_blessing(&mut rng);
            assert!(BLESSINGS.contains(&blessing));
        }
    }

    #[test]
    fn every_blessing_is_reachable() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut seen = [false; BLESSINGS.len()];
        for _ in 0..1000 {
            let blessing = random_blessing(&mut rng);
            let idx = BLESSINGS.iter().position(|&b| b == blessing).unwrap();
            seen[idx] = true;
        }
        assert!(seen.into_iter().all(|s| s));
    }
}
