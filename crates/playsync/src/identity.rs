//! Default names and colours for players who don't bring their own.

use rand::seq::IndexedRandom;

const ADJECTIVES: [&str; 12] = [
    "Swift", "Clever", "Bold", "Brave", "Quick", "Sharp", "Smart", "Keen", "Alert", "Nimble",
    "Slick", "Deft",
];

const NOUNS: [&str; 12] = [
    "Phoenix", "Tiger", "Falcon", "Eagle", "Wolf", "Lion", "Raven", "Fox", "Cheetah", "Hawk",
    "Osprey", "Lynx",
];

/// The avatar palette, all teal and slate.
pub const AVATAR_COLORS: [&str; 7] = [
    "#0D9488", "#14B8A6", "#2DD4BF", "#06B6D4", "#0891B2", "#155E75", "#1F2937",
];

/// Supplies a display name and avatar colour on join.
pub trait IdentitySource: Send + Sync + 'static {
    fn display_name(&self) -> String;
    fn avatar_color(&self) -> String;
}

/// "Adjective Noun" names and a random palette colour.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdentity;

impl IdentitySource for RandomIdentity {
    fn display_name(&self) -> String {
        let mut rng = rand::rng();
        let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("Swift");
        let noun = NOUNS.choose(&mut rng).copied().unwrap_or("Fox");
        format!("{adjective} {noun}")
    }

    fn avatar_color(&self) -> String {
        AVATAR_COLORS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(AVATAR_COLORS[0])
            .to_string()
    }
}
