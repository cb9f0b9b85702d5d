//! Contact detection between the player and everything else
//!
//! Detection only: nothing bounces or gets pushed. Each tick the engine
//! hands the resolver the player plus a list of bodies, and gets back one
//! [`ContactEvent`] per overlapping body, in the order the bodies were given.

use serde::{Deserialize, Serialize};

use super::category::{category, should_test};
use super::pool::{Entity, EntityHandle, EntityKind};
use super::rect::Rect;
use super::state::{Player, PowerUpKind};

/// Side of the play-field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryEdge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Invisible strip straddling one edge of the field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub edge: BoundaryEdge,
    pub bounds: Rect,
}

/// Build the four edge strips for a field, ordered left, right, top, bottom
pub fn boundaries_for(field: &Rect, thickness: f32) -> [Boundary; 4] {
    let t = thickness;
    let (min, max) = (field.min, field.max);
    let strip = |edge, x0: f32, y0: f32, x1: f32, y1: f32| Boundary {
        edge,
        bounds: Rect::new(x0, y0, x1 - x0, y1 - y0),
    };
    [
        strip(BoundaryEdge::Left, min.x - t, min.y - t, min.x + t, max.y + t),
        strip(BoundaryEdge::Right, max.x - t, min.y - t, max.x + t, max.y + t),
        strip(BoundaryEdge::Top, min.x - t, max.y - t, max.x + t, max.y + t),
        strip(BoundaryEdge::Bottom, min.x - t, min.y - t, max.x + t, min.y + t),
    ]
}

/// Contact reported to the engine (and forwarded to the host)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ContactEvent {
    PlayerPowerUp {
        handle: EntityHandle,
        kind: PowerUpKind,
    },
    PlayerObstacle {
        handle: EntityHandle,
    },
    /// Movement-assist signal: the host should zero velocity toward this edge
    PlayerBoundary {
        edge: BoundaryEdge,
    },
}

/// What a body stands for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyTag {
    Entity(EntityHandle, EntityKind),
    Boundary(BoundaryEdge),
}

/// Something the player can touch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub tag: BodyTag,
    pub category: u32,
    pub bounds: Rect,
}

impl Body {
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            tag: BodyTag::Entity(entity.handle, entity.kind),
            category: entity.category,
            bounds: entity.bounds(),
        }
    }

    pub fn from_boundary(boundary: &Boundary) -> Self {
        Self {
            tag: BodyTag::Boundary(boundary.edge),
            category: category::BOUNDARY,
            bounds: boundary.bounds,
        }
    }

    /// Enlarge the contact region (magnet pickup radius)
    pub fn inflated(mut self, amount: f32) -> Self {
        self.bounds = self.bounds.inflate(amount);
        self
    }

    /// Classify a contact with this body: power-up, then obstacle, then boundary
    fn classify(&self) -> Option<ContactEvent> {
        if self.category & category::POWER_UP != 0 {
            if let BodyTag::Entity(handle, EntityKind::PowerUp(kind)) = self.tag {
                return Some(ContactEvent::PlayerPowerUp { handle, kind });
            }
        }
        if self.category & category::OBSTACLE != 0 {
            if let BodyTag::Entity(handle, _) = self.tag {
                return Some(ContactEvent::PlayerObstacle { handle });
            }
        }
        if self.category & category::BOUNDARY != 0 {
            if let BodyTag::Boundary(edge) = self.tag {
                return Some(ContactEvent::PlayerBoundary { edge });
            }
        }
        None
    }
}

/// Stateless per-tick contact resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionResolver;

impl CollisionResolver {
    /// Contacts between the player and `bodies`, in body order
    pub fn resolve<I>(player: &Player, bodies: I) -> Vec<ContactEvent>
    where
        I: IntoIterator<Item = Body>,
    {
        let player_bounds = player.bounds();
        bodies
            .into_iter()
            .filter(|body| should_test(player.category, body.category))
            .filter(|body| player_bounds.intersects(&body.bounds))
            .filter_map(|body| body.classify())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pool::{EntityPool, PoolKind};
    use glam::Vec2;

    fn place(pool: &mut EntityPool, pos: Vec2, kind: EntityKind) -> EntityHandle {
        let handle = pool.acquire().unwrap();
        let entity = pool.get_mut(handle).unwrap();
        entity.position = pos;
        entity.size = Vec2::splat(30.0);
        entity.kind = kind;
        handle
    }

    fn player_at(pos: Vec2) -> Player {
        Player::new(pos, Vec2::splat(50.0))
    }

    #[test]
    fn test_overlapping_obstacle_and_power_up_in_entity_order() {
        let mut obstacles = EntityPool::new(PoolKind::Obstacle, 4);
        let mut power_ups = EntityPool::new(PoolKind::PowerUp, 4);
        let miss = place(&mut obstacles, Vec2::new(300.0, 300.0), EntityKind::Obstacle);
        let hit = place(&mut obstacles, Vec2::new(110.0, 100.0), EntityKind::Obstacle);
        let pickup = place(
            &mut power_ups,
            Vec2::new(90.0, 110.0),
            EntityKind::PowerUp(PowerUpKind::Magnet),
        );

        let player = player_at(Vec2::new(100.0, 100.0));
        let bodies = obstacles
            .active()
            .chain(power_ups.active())
            .map(Body::from_entity);
        let contacts = CollisionResolver::resolve(&player, bodies);

        assert_eq!(
            contacts,
            vec![
                ContactEvent::PlayerObstacle { handle: hit },
                ContactEvent::PlayerPowerUp {
                    handle: pickup,
                    kind: PowerUpKind::Magnet
                },
            ]
        );
        assert!(!contacts.contains(&ContactEvent::PlayerObstacle { handle: miss }));
    }

    #[test]
    fn test_order_follows_input_order() {
        let mut obstacles = EntityPool::new(PoolKind::Obstacle, 4);
        let a = place(&mut obstacles, Vec2::new(100.0, 100.0), EntityKind::Obstacle);
        let b = place(&mut obstacles, Vec2::new(105.0, 100.0), EntityKind::Obstacle);
        let player = player_at(Vec2::new(100.0, 100.0));

        let forward: Vec<Body> = obstacles.active().map(Body::from_entity).collect();
        let mut backward = forward.clone();
        backward.reverse();

        assert_eq!(
            CollisionResolver::resolve(&player, forward),
            vec![
                ContactEvent::PlayerObstacle { handle: a },
                ContactEvent::PlayerObstacle { handle: b }
            ]
        );
        assert_eq!(
            CollisionResolver::resolve(&player, backward),
            vec![
                ContactEvent::PlayerObstacle { handle: b },
                ContactEvent::PlayerObstacle { handle: a }
            ]
        );
    }

    #[test]
    fn test_boundary_contact_at_field_edge() {
        let field = Rect::new(0.0, 0.0, 400.0, 800.0);
        let strips = boundaries_for(&field, 2.0);
        let bodies = || strips.iter().map(Body::from_boundary);

        let centered = player_at(Vec2::new(200.0, 400.0));
        assert!(CollisionResolver::resolve(&centered, bodies()).is_empty());

        let at_left = player_at(Vec2::new(20.0, 400.0));
        assert_eq!(
            CollisionResolver::resolve(&at_left, bodies()),
            vec![ContactEvent::PlayerBoundary {
                edge: BoundaryEdge::Left
            }]
        );

        let in_corner = player_at(Vec2::new(390.0, 10.0));
        assert_eq!(
            CollisionResolver::resolve(&in_corner, bodies()),
            vec![
                ContactEvent::PlayerBoundary {
                    edge: BoundaryEdge::Right
                },
                ContactEvent::PlayerBoundary {
                    edge: BoundaryEdge::Bottom
                },
            ]
        );
    }

    #[test]
    fn test_untested_categories_are_skipped() {
        let player = player_at(Vec2::new(100.0, 100.0));
        let ghost = Body {
            tag: BodyTag::Boundary(BoundaryEdge::Top),
            category: category::NONE,
            bounds: Rect::new(90.0, 90.0, 20.0, 20.0),
        };
        assert!(CollisionResolver::resolve(&player, [ghost]).is_empty());
    }

    #[test]
    fn test_magnet_inflation_reaches_nearby_power_up() {
        let mut power_ups = EntityPool::new(PoolKind::PowerUp, 1);
        let handle = place(
            &mut power_ups,
            Vec2::new(160.0, 100.0),
            EntityKind::PowerUp(PowerUpKind::Shield),
        );
        let player = player_at(Vec2::new(100.0, 100.0));
        let entity = power_ups.get(handle).unwrap();

        assert!(CollisionResolver::resolve(&player, [Body::from_entity(entity)]).is_empty());
        assert_eq!(
            CollisionResolver::resolve(&player, [Body::from_entity(entity).inflated(40.0)]),
            vec![ContactEvent::PlayerPowerUp {
                handle,
                kind: PowerUpKind::Shield
            }]
        );
    }
}
