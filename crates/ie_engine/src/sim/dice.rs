use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub trait Dice {
    /// Rolls `count` dice with `sides` faces and adds `modifier`. A roll
    /// with no dice or no faces yields the modifier alone.
    fn roll(&mut self, count: u32, sides: u32, modifier: i32) -> i32;
}

#[derive(Debug, Clone)]
pub struct RandDice {
    rng: SmallRng,
}

impl RandDice {
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Dice for RandDice {
    fn roll(&mut self, count: u32, sides: u32, modifier: i32) -> i32 {
        if count == 0 || sides == 0 {
            return modifier;
        }
        let mut total = modifier;
        for _ in 0..count {
            total += self.rng.gen_range(1..=sides) as i32;
        }
        total
    }
}
