const LCG_MULTIPLIER: u128 = 0x5deece66d;
const LCG_INCREMENT: u128 = 0xb;

/// Seeded linear congruential generator, so every benchmark run sees the same graphs.
pub(crate) struct Lcg {
    state: u128,
}

impl Lcg {
    pub(crate) fn new_seed(seed: u128) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u128 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    pub(crate) fn generate_range(&mut self, range: usize) -> usize {
        ((self.next() >> 64) % range as u128) as usize
    }
}
