//! Timed status effects carried by every entity.

/// Active slow: a multiplier on movement speed and attack countdown rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slow {
    /// Seconds until the slow wears off.
    pub remaining: f32,
    /// Multiplier in `(0, 1]`.
    pub multiplier: f32,
}

/// Active rage-style buff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Buff {
    /// Seconds until the buff wears off.
    pub remaining: f32,
    /// Multiplier on movement and attack cadence.
    pub speed: f32,
    /// Multiplier on outgoing damage.
    pub damage: f32,
}

/// Stun, slow, shield, buff, invulnerability and invisibility bookkeeping for
/// one entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusEffects {
    stun: f32,
    slow: Option<Slow>,
    shield: f32,
    buff: Option<Buff>,
    invulnerable: f32,
    invisible: f32,
}

impl StatusEffects {
    /// Stuns the entity for at least `duration` seconds.
    pub fn apply_stun(&mut self, duration: f32) {
        self.stun = self.stun.max(duration);
    }

    /// Slows the entity. The stronger multiplier and the longer duration win.
    pub fn apply_slow(&mut self, duration: f32, multiplier: f32) {
        let multiplier = multiplier.clamp(0.0, 1.0);
        self.slow = Some(match self.slow {
            Some(active) => Slow {
                remaining: active.remaining.max(duration),
                multiplier: active.multiplier.min(multiplier),
            },
            None => Slow {
                remaining: duration,
                multiplier,
            },
        });
    }

    /// Adds shield charge that absorbs incoming damage.
    pub fn grant_shield(&mut self, amount: f32) {
        self.shield += amount.max(0.0);
    }

    /// Replaces any active buff with a new one.
    pub fn apply_buff(&mut self, duration: f32, speed: f32, damage: f32) {
        self.buff = Some(Buff {
            remaining: duration,
            speed,
            damage,
        });
    }

    /// Makes the entity ignore damage for at least `duration` seconds.
    pub fn grant_invulnerability(&mut self, duration: f32) {
        self.invulnerable = self.invulnerable.max(duration);
    }

    /// Hides the entity from enemy targeting for at least `duration` seconds.
    /// Area damage still lands.
    pub fn cloak(&mut self, duration: f32) {
        self.invisible = self.invisible.max(duration);
    }

    /// Ends any invisibility immediately.
    pub fn reveal(&mut self) {
        self.invisible = 0.0;
    }

    /// Counts every timer down by `dt` seconds and drops expired effects.
    pub fn tick(&mut self, dt: f32) {
        self.stun = (self.stun - dt).max(0.0);
        self.invulnerable = (self.invulnerable - dt).max(0.0);
        self.invisible = (self.invisible - dt).max(0.0);
        if let Some(slow) = &mut self.slow {
            slow.remaining -= dt;
            if slow.remaining <= 0.0 {
                self.slow = None;
            }
        }
        if let Some(buff) = &mut self.buff {
            buff.remaining -= dt;
            if buff.remaining <= 0.0 {
                self.buff = None;
            }
        }
    }

    /// Consumes shield charge against an incoming hit and returns the absorbed amount.
    pub fn absorb(&mut self, amount: f32) -> f32 {
        let absorbed = amount.min(self.shield).max(0.0);
        self.shield -= absorbed;
        absorbed
    }

    /// Reports whether the entity is stunned.
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        self.stun > 0.0
    }

    /// Seconds of stun left.
    #[must_use]
    pub const fn stun_remaining(&self) -> f32 {
        self.stun
    }

    /// Reports whether incoming damage is currently ignored.
    #[must_use]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }

    /// Reports whether enemies are unable to target the entity.
    #[must_use]
    pub fn is_invisible(&self) -> bool {
        self.invisible > 0.0
    }

    /// Remaining shield charge.
    #[must_use]
    pub const fn shield(&self) -> f32 {
        self.shield
    }

    /// Active slow, if any.
    #[must_use]
    pub const fn slow(&self) -> Option<Slow> {
        self.slow
    }

    /// Active buff, if any.
    #[must_use]
    pub const fn buff(&self) -> Option<Buff> {
        self.buff
    }

    /// Slow multiplier, `1.0` when no slow is active.
    #[must_use]
    pub fn slow_multiplier(&self) -> f32 {
        self.slow.map_or(1.0, |slow| slow.multiplier)
    }

    /// Combined multiplier on movement speed.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        if self.is_stunned() {
            return 0.0;
        }
        self.slow_multiplier() * self.buff.map_or(1.0, |buff| buff.speed)
    }

    /// Rate at which the attack countdown advances.
    #[must_use]
    pub fn attack_rate(&self) -> f32 {
        self.speed_multiplier()
    }

    /// Multiplier on outgoing damage.
    #[must_use]
    pub fn damage_multiplier(&self) -> f32 {
        self.buff.map_or(1.0, |buff| buff.damage)
    }
}
