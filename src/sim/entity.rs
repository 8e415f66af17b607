//! Entity types and the arena that stores them
//!
//! Every actor in a run is an `Entity` with a closed set of kinds. Entities
//! live in an `EntityStore` sorted by id; destruction only clears the `alive`
//! flag and the store compacts once per tick.

use glam::Vec2;
use serde::Serialize;

use crate::tuning::{EnemyColor, ShooterTuning};

/// Kind tag as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityTag {
    Player,
    Enemy,
    Bullet,
    EnemyBullet,
    Boss,
}

/// Which side an entity fights for (collision filtering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Faction {
    Player,
    Hostile,
}

/// Autonomous fire state for shooting enemies and bosses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shooter {
    pub interval_ms: f64,
    pub bullet_speed: f32,
    /// Sim time of the last shot (0 until the first one)
    pub last_shot_ms: f64,
}

impl Shooter {
    pub fn new(tuning: ShooterTuning) -> Self {
        Self {
            interval_ms: tuning.interval_ms,
            bullet_speed: tuning.bullet_speed,
            last_shot_ms: 0.0,
        }
    }

    /// Ready to fire at `now`
    pub fn ready(&self, now: f64) -> bool {
        now - self.last_shot_ms > self.interval_ms
    }
}

/// A regular enemy
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub color: EnemyColor,
    pub health: u32,
    pub points: u32,
    pub shooter: Option<Shooter>,
}

/// A boss, either a random tier roll or a layer's graduation boss
#[derive(Debug, Clone, PartialEq)]
pub struct Boss {
    /// Index into the tuning's boss tier table
    pub tier: usize,
    pub name: String,
    pub sprite_key: String,
    pub health: u32,
    pub max_health: u32,
    pub points: u32,
    pub scale: f32,
    /// Layer this boss graduates, if it is a graduation boss
    pub graduation_layer: Option<u8>,
    pub shooter: Option<Shooter>,
}

/// Closed set of non-player entity kinds
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Enemy(Enemy),
    Boss(Boss),
    PlayerBullet,
    EnemyBullet,
}

/// Outcome of a single bullet hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    /// Entity was already dead or cannot take damage
    Ignored,
    Damaged { remaining: u32 },
    Killed { points: u32 },
}

/// An active actor
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub alive: bool,
    pub kind: EntityKind,
}

impl Entity {
    pub fn tag(&self) -> EntityTag {
        match self.kind {
            EntityKind::Enemy(_) => EntityTag::Enemy,
            EntityKind::Boss(_) => EntityTag::Boss,
            EntityKind::PlayerBullet => EntityTag::Bullet,
            EntityKind::EnemyBullet => EntityTag::EnemyBullet,
        }
    }

    pub fn faction(&self) -> Faction {
        match self.kind {
            EntityKind::PlayerBullet => Faction::Player,
            _ => Faction::Hostile,
        }
    }

    /// Enemies and bosses (not bullets)
    pub fn is_hostile_body(&self) -> bool {
        matches!(self.kind, EntityKind::Enemy(_) | EntityKind::Boss(_))
    }

    pub fn is_bullet(&self) -> bool {
        matches!(self.kind, EntityKind::PlayerBullet | EntityKind::EnemyBullet)
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EntityKind::Boss(_))
    }

    pub fn health(&self) -> u32 {
        match &self.kind {
            EntityKind::Enemy(e) => e.health,
            EntityKind::Boss(b) => b.health,
            _ => 0,
        }
    }

    pub fn shooter_mut(&mut self) -> Option<&mut Shooter> {
        match &mut self.kind {
            EntityKind::Enemy(e) => e.shooter.as_mut(),
            EntityKind::Boss(b) => b.shooter.as_mut(),
            _ => None,
        }
    }

    /// Apply one point of damage. Dead entities ignore further hits so a
    /// kill can never be awarded twice.
    pub fn take_hit(&mut self) -> HitResult {
        if !self.alive {
            return HitResult::Ignored;
        }
        let (health, points) = match &mut self.kind {
            EntityKind::Enemy(e) => (&mut e.health, e.points),
            EntityKind::Boss(b) => (&mut b.health, b.points),
            _ => return HitResult::Ignored,
        };
        *health = health.saturating_sub(1);
        if *health == 0 {
            self.alive = false;
            HitResult::Killed { points }
        } else {
            HitResult::Damaged { remaining: *health }
        }
    }
}

/// The player ship (kept outside the arena; there is exactly one)
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

/// Id-ordered entity arena
#[derive(Debug, Clone)]
pub struct EntityStore {
    entities: Vec<Entity>,
    next_id: u32,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Add an entity, returning its id. Ids only grow, so the vec stays sorted.
    pub fn insert(&mut self, pos: Vec2, vel: Vec2, radius: f32, kind: EntityKind) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.entities.push(Entity {
            id,
            pos,
            vel,
            radius,
            alive: true,
            kind,
        });
        id
    }

    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entities[i])
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &mut self.entities[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.alive)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut().filter(|e| e.alive)
    }

    /// Raw slice including entities destroyed this tick
    pub fn as_mut_slice(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Live enemies and bosses
    pub fn hostile_count(&self) -> usize {
        self.iter().filter(|e| e.is_hostile_body()).count()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop destroyed entities
    pub fn compact(&mut self) {
        self.entities.retain(|e| e.alive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy(health: u32, points: u32) -> EntityKind {
        EntityKind::Enemy(Enemy {
            color: EnemyColor::Blue,
            health,
            points,
            shooter: None,
        })
    }

    #[test]
    fn test_ids_are_sorted_and_unique() {
        let mut store = EntityStore::new();
        let a = store.insert(Vec2::ZERO, Vec2::ZERO, 1.0, EntityKind::PlayerBullet);
        let b = store.insert(Vec2::ZERO, Vec2::ZERO, 1.0, EntityKind::EnemyBullet);
        assert!(b > a);
        assert_eq!(store.get(b).map(|e| e.tag()), Some(EntityTag::EnemyBullet));
    }

    #[test]
    fn test_take_hit_damages_then_kills() {
        let mut store = EntityStore::new();
        let id = store.insert(Vec2::ZERO, Vec2::ZERO, 10.0, enemy(2, 30));
        let e = store.get_mut(id).unwrap();
        assert_eq!(e.take_hit(), HitResult::Damaged { remaining: 1 });
        assert!(e.alive);
        assert_eq!(e.take_hit(), HitResult::Killed { points: 30 });
        assert!(!e.alive);
        // Second resolution on a dead entity is a no-op
        assert_eq!(e.take_hit(), HitResult::Ignored);
        assert_eq!(e.health(), 0);
    }

    #[test]
    fn test_bullets_cannot_take_hits() {
        let mut store = EntityStore::new();
        let id = store.insert(Vec2::ZERO, Vec2::ZERO, 1.0, EntityKind::PlayerBullet);
        assert_eq!(store.get_mut(id).unwrap().take_hit(), HitResult::Ignored);
    }

    #[test]
    fn test_compact_removes_dead() {
        let mut store = EntityStore::new();
        let a = store.insert(Vec2::ZERO, Vec2::ZERO, 1.0, enemy(1, 10));
        store.insert(Vec2::ZERO, Vec2::ZERO, 1.0, enemy(1, 10));
        store.get_mut(a).unwrap().alive = false;
        assert_eq!(store.len(), 1);
        assert_eq!(store.hostile_count(), 1);
        store.compact();
        assert!(store.get(a).is_none());
    }

    #[test]
    fn test_factions() {
        let mut store = EntityStore::new();
        let bullet = store.insert(Vec2::ZERO, Vec2::ZERO, 1.0, EntityKind::PlayerBullet);
        let foe = store.insert(Vec2::ZERO, Vec2::ZERO, 1.0, enemy(1, 10));
        assert_eq!(store.get(bullet).unwrap().faction(), Faction::Player);
        assert_eq!(store.get(foe).unwrap().faction(), Faction::Hostile);
    }
}
