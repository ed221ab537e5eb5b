//! Battle components and shared resources
//!
//! Positions use a feet-at-bottom convention: `Motion::position` is the point
//! where the character stands, and the bounding box extends upward (toward
//! negative y) from it.

use std::collections::VecDeque;

use bevy::prelude::*;
use bitflags::bitflags;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ============================================================================
// Collision groups
// ============================================================================

bitflags! {
    /// Collision groups, used as targeting masks by skills.
    ///
    /// Serialized as `"PLAYER | MOB"` in config files.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CollisionGroup: u8 {
        const PLAYER = 1 << 0;
        const MOB = 1 << 1;
    }
}

/// Collision group of a combatant
#[derive(Component, Debug, Clone, Copy)]
pub struct Collider(pub CollisionGroup);

// ============================================================================
// Characters
// ============================================================================

/// Every character that can appear on a battlefield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacterKind {
    // Players
    Raoul,
    Taji,
    Ember,
    Chia,
    // Mobs
    Egg,
    Pepper,
    Potato,
    MashedPotato,
}

impl CharacterKind {
    /// All player characters, in party order
    pub const PLAYERS: [CharacterKind; 4] = [
        CharacterKind::Raoul,
        CharacterKind::Taji,
        CharacterKind::Ember,
        CharacterKind::Chia,
    ];

    /// All mob characters
    pub const MOBS: [CharacterKind; 4] = [
        CharacterKind::Egg,
        CharacterKind::Pepper,
        CharacterKind::Potato,
        CharacterKind::MashedPotato,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CharacterKind::Raoul => "Raoul",
            CharacterKind::Taji => "Taji",
            CharacterKind::Ember => "Ember",
            CharacterKind::Chia => "Chia",
            CharacterKind::Egg => "Egg",
            CharacterKind::Pepper => "Pepper",
            CharacterKind::Potato => "Potato",
            CharacterKind::MashedPotato => "Mashed Potato",
        }
    }

    /// Key used for this character in save files
    pub fn save_key(&self) -> &'static str {
        match self {
            CharacterKind::Raoul => "raoul",
            CharacterKind::Taji => "taji",
            CharacterKind::Ember => "ember",
            CharacterKind::Chia => "chia",
            CharacterKind::Egg => "egg",
            CharacterKind::Pepper => "pepper",
            CharacterKind::Potato => "potato",
            CharacterKind::MashedPotato => "mashed_potato",
        }
    }

    pub fn is_player(&self) -> bool {
        Self::PLAYERS.contains(self)
    }
}

/// Marks a player-controlled combatant
#[derive(Component, Debug, Clone, Copy)]
pub struct PlayerComponent {
    pub kind: CharacterKind,
}

/// Marks an AI-controlled combatant
#[derive(Component, Debug, Clone, Copy)]
pub struct MobComponent {
    pub kind: CharacterKind,
}

/// Players with this marker pick their own actions (headless runs)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Autopilot;

/// Stun debuffs have no effect on entities carrying this marker
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct CcImmunity;

/// Attached when a combatant's effective HP reaches zero.
///
/// Counts down before the corpse is cleaned up. Mobs are despawned when it
/// expires; players stay on the field, defeated.
#[derive(Component, Debug, Clone, Copy)]
pub struct DeathTimer {
    /// Seconds left before cleanup
    pub remaining: f32,
}

impl DeathTimer {
    pub fn new(duration: f32) -> Self {
        Self {
            remaining: duration,
        }
    }

    pub fn has_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

// ============================================================================
// Motion
// ============================================================================

/// Position, velocity and extent of anything on the battlefield
#[derive(Component, Debug, Clone)]
pub struct Motion {
    /// Feet position in world units
    pub position: Vec2,
    /// World units per second, integrated by the physics pass
    pub velocity: Vec2,
    /// Width and height of the body
    pub bounding_box: Vec2,
    /// Remaining waypoints of the current walk
    pub path: VecDeque<Vec2>,
}

impl Motion {
    pub fn new(position: Vec2, bounding_box: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            bounding_box,
            path: VecDeque::new(),
        }
    }

    /// Centre of the body (half its height above the feet)
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.position.x,
            self.position.y - self.bounding_box.y.abs() / 2.0,
        )
    }

    /// Axis-aligned bounds of the body
    pub fn bounds(&self) -> Rect {
        let half_width = self.bounding_box.x.abs() / 2.0;
        Rect::from_corners(
            Vec2::new(self.position.x - half_width, self.position.y - self.bounding_box.y.abs()),
            Vec2::new(self.position.x + half_width, self.position.y),
        )
    }

    /// Point of the bounding box nearest to `point`
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        let bounds = self.bounds();
        point.clamp(bounds.min, bounds.max)
    }
}

// ============================================================================
// Presentation state
// ============================================================================

/// Animation clips a combatant can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimationType {
    Static,
    #[default]
    Idle,
    Move,
    Attack1,
    Attack2,
    Attack3,
    Hit,
    Defeat,
}

/// Sounds a skill can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SoundEffect {
    #[default]
    None,
    Melee,
    Projectile,
    Buff,
}

/// Visual effects attached to a combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FxType {
    Buffed,
    Debuffed,
    Shielded,
    Stunned,
    Candy1,
    Candy2,
}

impl FxType {
    /// Transient effects play once and are never stopped
    pub fn is_transient(&self) -> bool {
        matches!(self, FxType::Candy1 | FxType::Candy2)
    }
}

/// The animation a combatant is currently playing
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Animated {
    pub current: AnimationType,
}

/// Persistent effects currently shown on a combatant
#[derive(Component, Debug, Clone, Default)]
pub struct ActiveFx(pub SmallVec<[FxType; 4]>);

impl ActiveFx {
    pub fn contains(&self, fx: FxType) -> bool {
        self.0.contains(&fx)
    }
}

// ============================================================================
// Map
// ============================================================================

/// Grid cell value for a walkable tile
pub const WALKABLE_TILE: i32 = 3;

/// Walkability grid of the loaded level
#[derive(Resource, Debug, Clone)]
pub struct MapGrid {
    tile_size: f32,
    /// Row-major: `cells[y][x]`
    cells: Vec<Vec<i32>>,
}

impl MapGrid {
    /// Build a grid, rejecting empty, ragged or zero-scale maps
    pub fn new(tile_size: f32, cells: Vec<Vec<i32>>) -> Result<Self, String> {
        if tile_size <= 0.0 {
            return Err(format!("tile_size must be positive, got {}", tile_size));
        }
        let width = cells.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err("map grid must have at least one cell".to_string());
        }
        if let Some(row) = cells.iter().position(|row| row.len() != width) {
            return Err(format!(
                "map grid row {} has {} cells, expected {}",
                row,
                cells[row].len(),
                width
            ));
        }
        Ok(Self { tile_size, cells })
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn width(&self) -> usize {
        self.cells.first().map(Vec::len).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    /// Grid cell containing a world position (nearest cell centre)
    pub fn world_to_cell(&self, position: Vec2) -> IVec2 {
        (position / self.tile_size).round().as_ivec2()
    }

    /// World position of a grid cell
    pub fn cell_to_world(&self, cell: IVec2) -> Vec2 {
        cell.as_vec2() * self.tile_size
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width()
            && (cell.y as usize) < self.height()
    }

    /// Whether the static map allows walking on `cell`
    pub fn is_walkable_tile(&self, cell: IVec2) -> bool {
        self.in_bounds(cell) && self.cells[cell.y as usize][cell.x as usize] == WALKABLE_TILE
    }
}

// ============================================================================
// Randomness
// ============================================================================

/// Random number generator resource for battle decisions.
///
/// Seeded for deterministic replays, or from entropy otherwise.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    /// Create a new GameRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new GameRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Pick an index in `0..len`, or None when `len` is zero
    pub fn random_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_sits_half_a_body_above_the_feet() {
        let motion = Motion::new(Vec2::new(100.0, 200.0), Vec2::new(40.0, 80.0));
        assert_eq!(motion.center(), Vec2::new(100.0, 160.0));
    }

    #[test]
    fn test_closest_point_clamps_to_bounds() {
        let motion = Motion::new(Vec2::new(100.0, 200.0), Vec2::new(40.0, 80.0));
        assert_eq!(motion.closest_point(Vec2::new(0.0, 150.0)), Vec2::new(80.0, 150.0));
        assert_eq!(motion.closest_point(Vec2::new(110.0, 150.0)), Vec2::new(110.0, 150.0));
    }

    #[test]
    fn test_map_rejects_ragged_rows() {
        let result = MapGrid::new(10.0, vec![vec![3, 3], vec![3]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_world_to_cell_rounds_to_nearest() {
        let map = MapGrid::new(100.0, vec![vec![3; 4]; 4]).unwrap();
        assert_eq!(map.world_to_cell(Vec2::new(149.0, 51.0)), IVec2::new(1, 1));
        assert_eq!(map.world_to_cell(Vec2::new(151.0, 49.0)), IVec2::new(2, 0));
    }

    #[test]
    fn test_collision_group_parses_from_ron() {
        let group: CollisionGroup = ron::from_str("\"PLAYER | MOB\"").unwrap();
        assert_eq!(group, CollisionGroup::PLAYER | CollisionGroup::MOB);
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut a = GameRng::from_seed(7);
        let mut b = GameRng::from_seed(7);
        for _ in 0..10 {
            assert_eq!(a.random_index(5), b.random_index(5));
        }
        assert_eq!(a.random_index(0), None);
    }
}
