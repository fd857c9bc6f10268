//! Archetype tuning data loaded from `assets/data/enemies.ron`.
//!
//! Every field has a default, so a partial definition still yields a
//! playable enemy. A missing file or archetype entry is not fatal: the
//! built-in defaults are used and a warning is logged.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

/// Where the roster is read from, relative to the working directory.
pub const ROSTER_PATH: &str = "assets/data/enemies.ron";

/// Concrete enemy behavior profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Reflect)]
pub enum Archetype {
    /// Melee swinger.
    Skeleton,
    /// Ranged caster firing pooled projectiles.
    Infernum,
    /// Clings to the player and explodes.
    GardenGnome,
    /// Melee + special attacks, summons minions.
    Boss,
}

impl Archetype {
    pub const ALL: &[Self] = &[Self::Skeleton, Self::Infernum, Self::GardenGnome, Self::Boss];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Skeleton => "Skeleton",
            Self::Infernum => "Infernum",
            Self::GardenGnome => "Garden Gnome",
            Self::Boss => "Boss",
        }
    }

    /// Sound cue played when an enemy of this archetype dies.
    #[must_use]
    pub const fn death_cue(self) -> &'static str {
        match self {
            Self::Skeleton => "skeleton_death",
            Self::Infernum => "infernum_death",
            Self::GardenGnome => "gnome_death",
            Self::Boss => "boss_death",
        }
    }
}

/// Per-category divisors applied to raw distance when picking a target.
/// Higher weight means more attractive; zero or negative disables the category.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Reflect)]
#[serde(default)]
pub struct TargetPriorities {
    pub player: f32,
    pub plant: f32,
    pub home: f32,
}

impl Default for TargetPriorities {
    fn default() -> Self {
        Self {
            player: 1.0,
            plant: 1.2,
            home: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Reflect)]
#[serde(default)]
pub struct MeleeProfile {
    /// Radius of the hit-scan circle.
    pub attack_radius: f32,
    /// Distance of the hit-scan center in front of the body.
    pub attack_offset: f32,
    /// Wind-up between the swing trigger and the hit.
    pub swing_delay: f32,
    pub min_damage: f32,
    pub max_damage: f32,
}

impl Default for MeleeProfile {
    fn default() -> Self {
        Self {
            attack_radius: 16.0,
            attack_offset: 10.0,
            swing_delay: 0.3,
            min_damage: 8.0,
            max_damage: 12.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Reflect)]
#[serde(default)]
pub struct RangedProfile {
    pub shooting_distance: f32,
    /// Shots per second.
    pub fire_rate: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_lifetime: f32,
    /// Added to the target's y so shots aim at the body rather than the feet.
    pub aim_offset: f32,
}

impl Default for RangedProfile {
    fn default() -> Self {
        Self {
            shooting_distance: 160.0,
            fire_rate: 1.0,
            projectile_speed: 240.0,
            projectile_damage: 10.0,
            projectile_lifetime: 2.0,
            aim_offset: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Reflect)]
#[serde(default)]
pub struct ExplodingProfile {
    /// Chase stops this close to the target; contact does the rest.
    pub cling_distance: f32,
    pub cling_duration: f32,
    pub min_damage: f32,
    pub max_damage: f32,
}

impl Default for ExplodingProfile {
    fn default() -> Self {
        Self {
            cling_distance: 2.0,
            cling_duration: 1.5,
            min_damage: 20.0,
            max_damage: 35.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Reflect)]
#[serde(default)]
pub struct BossProfile {
    pub melee_radius: f32,
    pub special_radius: f32,
    /// Cooldown after a melee attack.
    pub melee_delay: f32,
    /// Cooldown after a special attack.
    pub special_delay: f32,
    pub melee_hit_delay: f32,
    pub special_hit_delay: f32,
    pub melee_min_damage: f32,
    pub melee_max_damage: f32,
    pub special_min_damage: f32,
    pub special_max_damage: f32,
    pub spawn_delay_after_minions_die: f32,
    pub minion_count: u32,
    pub minion_archetype: Archetype,
    pub minion_spawn_radius: f32,
}

impl Default for BossProfile {
    fn default() -> Self {
        Self {
            melee_radius: 40.0,
            special_radius: 90.0,
            melee_delay: 1.5,
            special_delay: 4.0,
            melee_hit_delay: 0.4,
            special_hit_delay: 0.9,
            melee_min_damage: 15.0,
            melee_max_damage: 25.0,
            special_min_damage: 30.0,
            special_max_damage: 45.0,
            spawn_delay_after_minions_die: 8.0,
            minion_count: 3,
            minion_archetype: Archetype::Skeleton,
            minion_spawn_radius: 48.0,
        }
    }
}

/// Archetype-specific behavior strategy carried by every enemy.
///
/// Exposes the hook values the shared states need (attack range, boss
/// timings) so states never reach into archetype internals.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Reflect)]
pub enum Behavior {
    Melee(MeleeProfile),
    Ranged(RangedProfile),
    Exploding(ExplodingProfile),
    Boss(BossProfile),
}

impl Behavior {
    /// Distance at which Chase hands over to Attack.
    #[must_use]
    pub fn attack_range(&self) -> f32 {
        match self {
            Self::Melee(melee) => melee.attack_radius + melee.attack_offset,
            Self::Ranged(ranged) => ranged.shooting_distance,
            Self::Exploding(exploding) => exploding.cling_distance,
            Self::Boss(boss) => boss.special_radius.max(boss.melee_radius),
        }
    }

    #[must_use]
    pub const fn boss(&self) -> Option<&BossProfile> {
        match self {
            Self::Boss(boss) => Some(boss),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_ranged(&self) -> bool {
        matches!(self, Self::Ranged(_))
    }
}

/// Full tuning of one archetype.
#[derive(Debug, Clone, PartialEq, Deserialize, Reflect)]
#[serde(default)]
pub struct EnemyDefinition {
    pub max_health: f32,
    pub move_speed: f32,
    pub detection_range: f32,
    pub attack_cooldown: f32,
    /// Body collider radius.
    pub radius: f32,
    pub priorities: TargetPriorities,
    pub behavior: Behavior,
}

impl Default for EnemyDefinition {
    fn default() -> Self {
        Self::fallback(Archetype::Skeleton)
    }
}

impl EnemyDefinition {
    /// Built-in tuning used when no data is available for `archetype`.
    #[must_use]
    pub fn fallback(archetype: Archetype) -> Self {
        let base = Self {
            max_health: 60.0,
            move_speed: 70.0,
            detection_range: 320.0,
            attack_cooldown: 1.2,
            radius: 10.0,
            priorities: TargetPriorities::default(),
            behavior: Behavior::Melee(MeleeProfile::default()),
        };
        match archetype {
            Archetype::Skeleton => base,
            Archetype::Infernum => Self {
                max_health: 40.0,
                move_speed: 55.0,
                attack_cooldown: 1.0,
                behavior: Behavior::Ranged(RangedProfile::default()),
                ..base
            },
            Archetype::GardenGnome => Self {
                max_health: 25.0,
                move_speed: 110.0,
                radius: 7.0,
                priorities: TargetPriorities {
                    player: 1.5,
                    plant: 0.5,
                    home: 0.5,
                },
                behavior: Behavior::Exploding(ExplodingProfile::default()),
                ..base
            },
            Archetype::Boss => Self {
                max_health: 800.0,
                move_speed: 40.0,
                detection_range: 480.0,
                attack_cooldown: 1.5,
                radius: 24.0,
                behavior: Behavior::Boss(BossProfile::default()),
                ..base
            },
        }
    }
}

/// Errors raised while reading the roster file.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read enemy roster '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse enemy roster '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// All archetype definitions known to the game.
#[derive(Resource, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnemyRoster {
    archetypes: HashMap<Archetype, EnemyDefinition>,
}

impl EnemyRoster {
    /// Parse a roster from RON text. `origin` only labels errors.
    pub fn from_ron(text: &str, origin: &str) -> Result<Self, RosterError> {
        ron::from_str(text).map_err(|source| RosterError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Read and parse the roster at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RosterError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron(&text, &path.display().to_string())
    }

    /// Tuning for `archetype`, falling back to built-in defaults with a warning.
    #[must_use]
    pub fn definition(&self, archetype: Archetype) -> EnemyDefinition {
        if let Some(definition) = self.archetypes.get(&archetype) {
            return definition.clone();
        }
        warn!(
            "no roster entry for {}; using built-in defaults",
            archetype.display_name()
        );
        EnemyDefinition::fallback(archetype)
    }

    #[must_use]
    pub fn contains(&self, archetype: Archetype) -> bool {
        self.archetypes.contains_key(&archetype)
    }

    pub fn insert(&mut self, archetype: Archetype, definition: EnemyDefinition) {
        self.archetypes.insert(archetype, definition);
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.archetypes.len()
    }
}

/// Load the roster into a resource. Never fails: errors degrade to defaults.
pub(crate) fn load_enemy_roster(mut commands: Commands) {
    let roster = match EnemyRoster::load(ROSTER_PATH) {
        Ok(roster) => {
            info!("Loaded {} enemy definitions", roster.len());
            roster
        }
        Err(err) => {
            warn!("{err}; using built-in enemy defaults");
            EnemyRoster::default()
        }
    };
    commands.insert_resource(roster);
}
