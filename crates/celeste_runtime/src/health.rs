//! Hit points shared by the player and enemies

/// What changed after a health operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthEvent {
    Damaged { amount: i32 },
    Healed { amount: i32 },
    Changed { current: i32, max: i32 },
    Died,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthComponent {
    max: i32,
    current: i32,
    dead: bool,
}

impl HealthComponent {
    /// Full health; `max` is raised to at least 1
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self {
            max,
            current: max,
            dead: false,
        }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Remaining health in `0.0..=1.0`
    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    /// Subtract health. Ignored when dead or for non-positive amounts.
    pub fn damage(&mut self, amount: i32) -> Vec<HealthEvent> {
        if self.dead || amount <= 0 {
            return Vec::new();
        }
        let before = self.current;
        self.current = (self.current - amount).max(0);
        let mut events = vec![
            HealthEvent::Damaged {
                amount: before - self.current,
            },
            HealthEvent::Changed {
                current: self.current,
                max: self.max,
            },
        ];
        if self.current == 0 {
            self.dead = true;
            events.push(HealthEvent::Died);
        }
        events
    }

    /// Restore health up to the maximum. Ignored when dead or for non-positive amounts.
    pub fn heal(&mut self, amount: i32) -> Vec<HealthEvent> {
        if self.dead || amount <= 0 {
            return Vec::new();
        }
        let before = self.current;
        self.current = (self.current + amount).min(self.max);
        let healed = self.current - before;
        if healed <= 0 {
            return Vec::new();
        }
        vec![
            HealthEvent::Healed { amount: healed },
            HealthEvent::Changed {
                current: self.current,
                max: self.max,
            },
        ]
    }

    pub fn kill(&mut self) -> Vec<HealthEvent> {
        if self.dead {
            return Vec::new();
        }
        self.current = 0;
        self.dead = true;
        vec![
            HealthEvent::Changed {
                current: 0,
                max: self.max,
            },
            HealthEvent::Died,
        ]
    }

    /// Back to full health and alive
    pub fn reset(&mut self) {
        self.current = self.max;
        self.dead = false;
    }
}
