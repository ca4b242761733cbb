//! Toss kinematics
//!
//! Initial velocities for a card thrown from the deck to a seat. The per-side
//! numbers are tuned by eye: nearby seats get a soft lob, the far seat a faster,
//! higher throw with more spin.

use glam::Vec3;
use rand::Rng;

use super::engine::Velocity;
use super::layout::Side;
use crate::flatten;

/// Horizontal jitter for one-at-a-time deals
pub const STANDARD_JITTER: f32 = 0.025;
/// Tighter jitter inside a euchre bundle
pub const BUNDLE_JITTER: f32 = 0.015;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TossProfile {
    pub horizontal_speed: f32,
    pub upward_speed: f32,
    pub spin_intensity: f32,
}

/// Indexed by side - 1. The dealer sits at side 1.
pub const TOSS_PROFILES: [TossProfile; 4] = [
    TossProfile {
        horizontal_speed: 0.55,
        upward_speed: 0.9,
        spin_intensity: 0.6,
    },
    TossProfile {
        horizontal_speed: 0.85,
        upward_speed: 1.1,
        spin_intensity: 1.0,
    },
    TossProfile {
        horizontal_speed: 1.05,
        upward_speed: 1.25,
        spin_intensity: 1.3,
    },
    TossProfile {
        horizontal_speed: 0.85,
        upward_speed: 1.1,
        spin_intensity: 1.0,
    },
];

/// Y spin range before scaling by the side's intensity (rad/s)
const SPIN_MIN: f32 = 2.0;
const SPIN_MAX: f32 = 5.0;
/// X/Z tumble range (rad/s)
const TUMBLE: f32 = 0.6;

pub fn profile(side: Side) -> TossProfile {
    TOSS_PROFILES[side.index()]
}

/// Nudge a landing target sideways so tossed cards never share a trajectory
pub fn jitter_target(target: Vec3, amount: f32, rng: &mut impl Rng) -> Vec3 {
    if amount <= 0.0 {
        return target;
    }
    target
        + Vec3::new(
            rng.random_range(-amount..=amount),
            0.0,
            rng.random_range(-amount..=amount),
        )
}

/// Linear and angular velocity that throws a card from `start` toward `target`
pub fn velocity_for_toss(start: Vec3, target: Vec3, side: Side, rng: &mut impl Rng) -> Velocity {
    let p = profile(side);

    let planar = flatten(target - start);
    let direction = if planar.length_squared() > 1e-12 {
        planar.normalize()
    } else {
        Vec3::ZERO
    };
    let linear = Vec3::new(
        direction.x * p.horizontal_speed,
        p.upward_speed,
        direction.z * p.horizontal_speed,
    );

    // Far seats spin the other way so the whole deal does not twist in unison
    let spin_sign = match side {
        Side::Top | Side::Right => -1.0,
        Side::Bottom | Side::Left => 1.0,
    };
    let angular = Vec3::new(
        rng.random_range(-TUMBLE..=TUMBLE),
        spin_sign * rng.random_range(SPIN_MIN..=SPIN_MAX) * p.spin_intensity,
        rng.random_range(-TUMBLE..=TUMBLE),
    );

    Velocity::new(linear, angular)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_toss_heads_toward_target() {
        let mut rng = Pcg32::seed_from_u64(1);
        let start = Vec3::new(0.0, 0.01, 0.2);
        let target = Vec3::new(-0.3, 0.0, 0.0);
        let v = velocity_for_toss(start, target, Side::Left, &mut rng);
        let planar = Vec3::new(v.linear.x, 0.0, v.linear.z);
        let expected = Vec3::new(target.x - start.x, 0.0, target.z - start.z).normalize();
        assert!((planar.normalize() - expected).length() < 1e-5);
        assert!((planar.length() - profile(Side::Left).horizontal_speed).abs() < 1e-5);
        assert_eq!(v.linear.y, profile(Side::Left).upward_speed);
    }

    #[test]
    fn test_far_seat_gets_harder_toss() {
        let near = profile(Side::Bottom);
        let far = profile(Side::Top);
        assert!(far.horizontal_speed > near.horizontal_speed);
        assert!(far.upward_speed > near.upward_speed);
        assert!(far.spin_intensity > near.spin_intensity);
    }

    #[test]
    fn test_spin_direction_flips_for_two_sides() {
        let mut rng = Pcg32::seed_from_u64(9);
        let signs: Vec<f32> = Side::ALL
            .iter()
            .map(|&side| velocity_for_toss(Vec3::ZERO, Vec3::X, side, &mut rng).angular.y.signum())
            .collect();
        assert_eq!(signs, vec![1.0, 1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_jitter_is_bounded() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..200 {
            let t = jitter_target(Vec3::new(1.0, 0.5, -1.0), STANDARD_JITTER, &mut rng);
            assert!((t.x - 1.0).abs() <= STANDARD_JITTER + 1e-6);
            assert!((t.z + 1.0).abs() <= STANDARD_JITTER + 1e-6);
            assert_eq!(t.y, 0.5);
        }
    }

    proptest! {
        #[test]
        fn prop_zero_direction_has_no_horizontal_velocity(
            x in -1.0f32..1.0,
            y in 0.0f32..0.5,
            z in -1.0f32..1.0,
            target_y in 0.0f32..0.5,
            side_n in 1u8..=4,
            seed in any::<u64>(),
        ) {
            let side = Side::from_number(side_n).unwrap();
            let mut rng = Pcg32::seed_from_u64(seed);
            let v = velocity_for_toss(Vec3::new(x, y, z), Vec3::new(x, target_y, z), side, &mut rng);
            prop_assert_eq!(v.linear.x, 0.0);
            prop_assert_eq!(v.linear.z, 0.0);
        }

        #[test]
        fn prop_spin_is_bounded(seed in any::<u64>(), side_n in 1u8..=4) {
            let side = Side::from_number(side_n).unwrap();
            let mut rng = Pcg32::seed_from_u64(seed);
            let v = velocity_for_toss(Vec3::ZERO, Vec3::new(0.3, 0.0, -0.2), side, &mut rng);
            let p = profile(side);
            prop_assert!(v.angular.y.abs() >= SPIN_MIN * p.spin_intensity - 1e-4);
            prop_assert!(v.angular.y.abs() <= SPIN_MAX * p.spin_intensity + 1e-4);
            prop_assert!(v.angular.x.abs() <= TUMBLE);
            prop_assert!(v.angular.z.abs() <= TUMBLE);
        }
    }
}
