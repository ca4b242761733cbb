//! Layout calculator
//!
//! Pure functions from (side, index, count, tuning) to a target transform.
//!
//! Each side has its own pivot and its own mapping from the local fan frame
//! (lateral = player's right, depth = toward the table centre) to world X/Z.
//! The signs differ per side so that every fan opens toward the middle of the
//! table.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::entity::{Transform, flip_rotation};
use crate::consts::*;
use crate::settings::SideLayout;
use crate::yaw;

/// One of the four seats. 1 = near the viewer, then clockwise seen from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Bottom = 1,
    Left = 2,
    Top = 3,
    Right = 4,
}

/// Seat pivots for hands held above the table
const HAND_HEIGHT: f32 = 0.10;
const HAND_DISTANCE: f32 = 0.56;
/// Where each side's dealt pile ends up
const STACK_DISTANCE: f32 = 0.32;
/// Gather corners sit this far out on both axes
const CORNER_DISTANCE: f32 = 0.42;

/// Re-fan constants (independent of per-side tuning)
const REFAN_RADIUS: f32 = 0.25;
const REFAN_SPREAD: f32 = 0.12;
const REFAN_TILT: f32 = 50.0;
const REFAN_LIFT: f32 = 0.001;

impl Side {
    pub const ALL: [Side; 4] = [Side::Bottom, Side::Left, Side::Top, Side::Right];

    /// Side from its 1-4 number
    pub fn from_number(n: u8) -> Option<Side> {
        match n {
            1 => Some(Side::Bottom),
            2 => Some(Side::Left),
            3 => Some(Side::Top),
            4 => Some(Side::Right),
            _ => None,
        }
    }

    /// 1-4
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// 0-3, for per-side arrays
    pub fn index(&self) -> usize {
        *self as usize - 1
    }

    /// Yaw that turns a card's top edge (local -Z) toward the table centre
    pub fn facing(&self) -> f32 {
        match self {
            Side::Bottom => 0.0,
            Side::Left => -FRAC_PI_2,
            Side::Top => PI,
            Side::Right => FRAC_PI_2,
        }
    }

    /// The player's right hand, in world space
    pub fn right(&self) -> Vec3 {
        match self {
            Side::Bottom => Vec3::X,
            Side::Left => Vec3::Z,
            Side::Top => Vec3::NEG_X,
            Side::Right => Vec3::NEG_Z,
        }
    }

    /// From the seat toward the table centre
    pub fn forward(&self) -> Vec3 {
        match self {
            Side::Bottom => Vec3::NEG_Z,
            Side::Left => Vec3::X,
            Side::Top => Vec3::Z,
            Side::Right => Vec3::NEG_X,
        }
    }

    /// Fan pivot for this side's hand
    pub fn hand_center(&self) -> Vec3 {
        -self.forward() * HAND_DISTANCE + Vec3::Y * HAND_HEIGHT
    }

    /// Where this side's pile sits on the felt
    pub fn stack_point(&self) -> Vec3 {
        -self.forward() * STACK_DISTANCE + Vec3::Y * (FELT_HEIGHT + CARD_HALF_THICKNESS)
    }
}

/// Table corner for gathering, named from the viewer's seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Corner {
    NearLeft,
    NearRight,
    FarLeft,
    FarRight,
}

impl Corner {
    pub fn point(&self) -> Vec3 {
        let (x, z) = match self {
            Corner::NearLeft => (-CORNER_DISTANCE, CORNER_DISTANCE),
            Corner::NearRight => (CORNER_DISTANCE, CORNER_DISTANCE),
            Corner::FarLeft => (-CORNER_DISTANCE, -CORNER_DISTANCE),
            Corner::FarRight => (CORNER_DISTANCE, -CORNER_DISTANCE),
        };
        Vec3::new(x, FELT_HEIGHT + CARD_HALF_THICKNESS, z)
    }
}

/// Fan slot for card `index` of `count` held by `side`.
///
/// Rotation order: side facing, user offset, fan spread, tilt back, face-up flip.
pub fn position_and_orientation(
    side: Side,
    index: usize,
    count: usize,
    params: &SideLayout,
) -> (Vec3, Quat) {
    let denom = count.saturating_sub(1).max(1) as f32;
    let progress = if count > 1 {
        index as f32 / denom - 0.5
    } else {
        0.0
    };
    let arc_angle = progress * params.fan_angle.to_radians();

    let lateral = arc_angle.sin() * params.arc_radius;
    let depth = arc_angle.cos() * params.arc_radius;
    let lift = index as f32 * params.vertical_spacing;

    let c = side.hand_center();
    let position = match side {
        Side::Bottom => Vec3::new(c.x + lateral, c.y + lift, c.z - depth),
        Side::Left => Vec3::new(c.x + depth, c.y + lift, c.z + lateral),
        Side::Top => Vec3::new(c.x - lateral, c.y + lift, c.z + depth),
        Side::Right => Vec3::new(c.x - depth, c.y + lift, c.z - lateral),
    };

    let rotation = yaw(side.facing())
        * yaw(params.rotation_offset.to_radians())
        * yaw(-arc_angle)
        * Quat::from_rotation_x(params.tilt_angle.to_radians())
        * flip_rotation();

    (position, rotation)
}

/// Same as [`position_and_orientation`], as a transform
pub fn fan_transform(side: Side, index: usize, count: usize, params: &SideLayout) -> Transform {
    let (position, rotation) = position_and_orientation(side, index, count, params);
    Transform::new(position, rotation)
}

/// Re-fan slot for cards already on a side. Fixed radius and per-card spread,
/// does not read the per-side tuning.
pub fn refan_transform(side: Side, index: usize, count: usize) -> Transform {
    let centered = index as f32 - (count.max(1) - 1) as f32 / 2.0;
    let angle = centered * REFAN_SPREAD;

    let offset = side.right() * angle.sin() * REFAN_RADIUS + side.forward() * angle.cos() * REFAN_RADIUS;
    let position = side.hand_center() + offset + Vec3::Y * (index as f32 * REFAN_LIFT);
    let rotation = yaw(side.facing())
        * yaw(-angle)
        * Quat::from_rotation_x(REFAN_TILT.to_radians())
        * flip_rotation();

    Transform::new(position, rotation)
}

/// Pile slot `index` on `side`: face up, readable from that seat
pub fn stack_transform(side: Side, index: usize) -> Transform {
    Transform::new(
        side.stack_point() + Vec3::Y * (index as f32 * STACK_STEP),
        yaw(side.facing()) * flip_rotation(),
    )
}

/// Face-down deck slot `index` (0 = bottom)
pub fn deck_transform(index: usize) -> Transform {
    Transform::from_position(DECK_POINT + Vec3::Y * (index as f32 * STACK_STEP))
}

/// Face-down gathered pile slot at a corner
pub fn corner_transform(corner: Corner, index: usize) -> Transform {
    Transform::from_position(corner.point() + Vec3::Y * (index as f32 * STACK_STEP))
}

/// Hand fixture placement
pub fn hand_transform(side: Side) -> Transform {
    Transform::new(side.hand_center(), yaw(side.facing()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planar_distance;
    use crate::table::entity::is_face_up;
    use proptest::prelude::*;

    #[test]
    fn test_side_numbers_roundtrip() {
        for side in Side::ALL {
            assert_eq!(Side::from_number(side.number()), Some(side));
        }
        assert_eq!(Side::from_number(0), None);
        assert_eq!(Side::from_number(5), None);
    }

    #[test]
    fn test_facing_matches_basis() {
        for side in Side::ALL {
            let top_edge = yaw(side.facing()) * Vec3::NEG_Z;
            assert!((top_edge - side.forward()).length() < 1e-5, "{:?}", side);
            let right = yaw(side.facing()) * Vec3::X;
            assert!((right - side.right()).length() < 1e-5, "{:?}", side);
        }
    }

    #[test]
    fn test_single_card_is_centered() {
        let params = SideLayout::default();
        for side in Side::ALL {
            let (pos, rot) = position_and_orientation(side, 0, 1, &params);
            let expected = side.hand_center() + side.forward() * params.arc_radius;
            assert!((pos - expected).length() < 1e-5, "{:?}", side);
            // No fan spread: the top edge points straight at the centre
            let top = rot * Vec3::NEG_Z;
            let flat = Vec3::new(top.x, 0.0, top.z).normalize();
            assert!((flat - side.forward()).length() < 1e-4, "{:?}", side);
        }
    }

    #[test]
    fn test_fans_open_toward_table_center() {
        let params = SideLayout::default();
        for side in Side::ALL {
            let (pos, _) = position_and_orientation(side, 2, 5, &params);
            assert!(
                pos.length() < side.hand_center().length(),
                "{:?} fan points away from the table",
                side
            );
        }
    }

    #[test]
    fn test_fan_is_symmetric() {
        let params = SideLayout::default();
        for side in Side::ALL {
            let (first, _) = position_and_orientation(side, 0, 5, &params);
            let (last, _) = position_and_orientation(side, 4, 5, &params);
            let lat_first = (first - side.hand_center()).dot(side.right());
            let lat_last = (last - side.hand_center()).dot(side.right());
            assert!((lat_first + lat_last).abs() < 1e-5);
            assert!(lat_first < 0.0);
        }
    }

    #[test]
    fn test_fanned_cards_are_face_up() {
        let params = SideLayout::default();
        for side in Side::ALL {
            for i in 0..5 {
                let (_, rot) = position_and_orientation(side, i, 5, &params);
                assert!(is_face_up(rot));
            }
        }
    }

    #[test]
    fn test_stack_and_refan_face_up() {
        for side in Side::ALL {
            assert!(is_face_up(stack_transform(side, 3).rotation));
            assert!(is_face_up(refan_transform(side, 1, 5).rotation));
            let top = stack_transform(side, 0).rotation * Vec3::NEG_Z;
            assert!((top - side.forward()).length() < 1e-5);
        }
        assert!(!is_face_up(deck_transform(0).rotation));
    }

    #[test]
    fn test_refan_ignores_tuning_and_is_centered() {
        for side in Side::ALL {
            let t = refan_transform(side, 0, 1);
            let expected = side.hand_center() + side.forward() * REFAN_RADIUS;
            assert!((t.position - expected).length() < 1e-5);
        }
    }

    #[test]
    fn test_stack_steps_up() {
        let a = stack_transform(Side::Left, 0).position;
        let b = stack_transform(Side::Left, 1).position;
        assert!((b.y - a.y - STACK_STEP).abs() < 1e-6);
        assert_eq!(a.x, b.x);
        assert_eq!(a.z, b.z);
    }

    proptest! {
        #[test]
        fn prop_fan_stays_within_radius(
            side_n in 1u8..=4,
            count in 1usize..24,
            index_seed in 0usize..24,
            fan_angle in 0.0f32..120.0,
            tilt_angle in 0.0f32..80.0,
            arc_radius in 0.01f32..0.5,
            rotation_offset in -45.0f32..45.0,
        ) {
            let side = Side::from_number(side_n).unwrap();
            let index = index_seed % count;
            let params = SideLayout {
                fan_angle,
                tilt_angle,
                arc_radius,
                vertical_spacing: 0.0015,
                rotation_offset,
            };
            let (pos, rot) = position_and_orientation(side, index, count, &params);
            prop_assert!(planar_distance(pos, side.hand_center()) <= arc_radius + 1e-4);
            prop_assert!((rot.length() - 1.0).abs() < 1e-3);
        }
    }
}
