#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Attack cadence, status effects and damage resolution.
//!
//! The types in this crate carry no knowledge of the entity registry. The
//! battle owns one [`AttackTimer`] and one [`StatusEffects`] per entity and
//! routes every incoming hit through [`apply_damage`].

mod ramp;
mod status;

use arena_battle_core::Position;

pub use ramp::DamageRamp;
pub use status::{Buff, Slow, StatusEffects};

/// Countdown until an entity may attack again.
///
/// The countdown advances at a rate scaled by slow and buff multipliers, so a
/// slow stretches the effective interval by the inverse of its multiplier.
/// Stunned entities do not advance their timer at all and resume from the
/// frozen value when the stun ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackTimer {
    interval: f32,
    remaining: f32,
}

impl AttackTimer {
    /// Creates a timer that is ready to fire immediately.
    #[must_use]
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(0.0),
            remaining: 0.0,
        }
    }

    /// Base seconds between attacks.
    #[must_use]
    pub const fn interval(&self) -> f32 {
        self.interval
    }

    /// Seconds of countdown left at the normal rate.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Replaces the base interval without touching the running countdown.
    pub fn set_interval(&mut self, interval: f32) {
        self.interval = interval.max(0.0);
    }

    /// Advances the countdown by `dt` seconds at the provided rate.
    pub fn advance(&mut self, dt: f32, rate: f32) {
        if self.remaining > 0.0 {
            self.remaining = (self.remaining - dt * rate.max(0.0)).max(0.0);
        }
    }

    /// Reports whether the next attack may start.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Restarts the countdown after an attack.
    pub fn reset(&mut self) {
        self.remaining = self.interval;
    }

    /// Delays the next attack by the provided number of seconds.
    pub fn delay(&mut self, seconds: f32) {
        self.remaining += seconds.max(0.0);
    }
}

/// Outcome of routing a hit through [`apply_damage`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DamageReport {
    /// Damage soaked by a shield.
    pub absorbed: f32,
    /// Hitpoints actually removed.
    pub dealt: f32,
    /// Whether the hit brought hitpoints to zero or below.
    pub lethal: bool,
}

/// Applies `amount` damage to an entity.
///
/// Invulnerable entities ignore the hit entirely. Otherwise an active shield
/// absorbs damage first and the remainder is removed from `hitpoints`.
pub fn apply_damage(hitpoints: &mut f32, status: &mut StatusEffects, amount: f32) -> DamageReport {
    if amount <= 0.0 || status.is_invulnerable() || *hitpoints <= 0.0 {
        return DamageReport::default();
    }

    let absorbed = status.absorb(amount);
    let remainder = amount - absorbed;
    let dealt = remainder.min(*hitpoints);
    *hitpoints -= remainder;

    DamageReport {
        absorbed,
        dealt,
        lethal: *hitpoints <= 0.0,
    }
}

/// Reports whether a target is close enough to be hit.
///
/// Range is measured from the attacker's position to the edge of the target's
/// body.
#[must_use]
pub fn in_attack_range(
    attacker: Position,
    range: f32,
    target: Position,
    target_radius: f32,
) -> bool {
    attacker.distance_to(target) <= range + target_radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_timer_fires_immediately() {
        let timer = AttackTimer::new(1.2);
        assert!(timer.is_ready());
    }

    #[test]
    fn reset_waits_one_interval() {
        let mut timer = AttackTimer::new(1.0);
        timer.reset();
        for _ in 0..29 {
            timer.advance(1.0 / 30.0, 1.0);
        }
        assert!(!timer.is_ready());
        timer.advance(1.0 / 30.0, 1.0);
        timer.advance(1e-4, 1.0);
        assert!(timer.is_ready());
    }

    #[test]
    fn slowed_countdown_stretches_the_interval() {
        let mut timer = AttackTimer::new(1.0);
        timer.reset();
        timer.advance(1.0, 0.5);
        assert!((timer.remaining() - 0.5).abs() < 1e-6);
        timer.advance(1.0, 0.5);
        assert!(timer.is_ready());
    }

    #[test]
    fn frozen_timer_resumes_where_it_stopped() {
        let mut timer = AttackTimer::new(1.0);
        timer.reset();
        timer.advance(0.4, 1.0);
        let frozen = timer.remaining();
        timer.advance(0.5, 0.0);
        assert_eq!(timer.remaining(), frozen);
        timer.advance(0.6, 1.0);
        assert!(timer.is_ready());
    }

    #[test]
    fn shield_absorbs_before_hitpoints() {
        let mut hitpoints = 100.0;
        let mut status = StatusEffects::default();
        status.grant_shield(30.0);
        let report = apply_damage(&mut hitpoints, &mut status, 50.0);
        assert_eq!(report.absorbed, 30.0);
        assert_eq!(report.dealt, 20.0);
        assert_eq!(hitpoints, 80.0);
        assert_eq!(status.shield(), 0.0);
        assert!(!report.lethal);
    }

    #[test]
    fn invulnerable_entities_ignore_hits() {
        let mut hitpoints = 10.0;
        let mut status = StatusEffects::default();
        status.grant_invulnerability(0.5);
        let report = apply_damage(&mut hitpoints, &mut status, 100.0);
        assert_eq!(report, DamageReport::default());
        assert_eq!(hitpoints, 10.0);
    }

    #[test]
    fn lethal_hits_are_reported_once() {
        let mut hitpoints = 10.0;
        let mut status = StatusEffects::default();
        let report = apply_damage(&mut hitpoints, &mut status, 25.0);
        assert!(report.lethal);
        assert_eq!(report.dealt, 10.0);
        let again = apply_damage(&mut hitpoints, &mut status, 25.0);
        assert!(!again.lethal);
    }

    #[test]
    fn range_includes_target_body() {
        let attacker = Position::new(3.5, 18.0);
        let tower = Position::new(3.5, 25.5);
        assert!(!in_attack_range(attacker, 6.0, tower, 1.0));
        assert!(in_attack_range(attacker, 6.0, tower, 1.5));
    }
}
