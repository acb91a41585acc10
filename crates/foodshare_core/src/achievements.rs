//! crates/foodshare_core/src/achievements.rs
//!
//! Fixed achievement definitions and the rule deciding when one is earned.
//! Persistence guarantees each achievement is awarded at most once per user.

/// A static achievement definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDef {
    /// The counter this achievement tracks.
    pub kind: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Count of `kind` events at which the achievement unlocks.
    pub target: u32,
}

pub const DEFINITIONS: &[AchievementDef] = &[
    AchievementDef {
        kind: "donation",
        name: "First Donation",
        description: "Made your first food donation",
        target: 1,
    },
    AchievementDef {
        kind: "waste_prevention",
        name: "Waste Warrior",
        description: "Prevented 10+ items from going to waste",
        target: 10,
    },
    AchievementDef {
        kind: "community",
        name: "Community Hero",
        description: "Donated 25+ meals to the community",
        target: 25,
    },
    AchievementDef {
        kind: "consumption",
        name: "Fresh Keeper",
        description: "Consumed 50+ items before expiry",
        target: 50,
    },
];

/// Returns the definitions of `kind` whose target the current count meets.
/// Deduplication against already-earned achievements is the store's job.
pub fn earned(kind: &str, count: u32) -> Vec<&'static AchievementDef> {
    DEFINITIONS
        .iter()
        .filter(|def| def.kind == kind && count >= def.target)
        .collect()
}
