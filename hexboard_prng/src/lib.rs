// Dice source for hexboard clients.
//
// xoshiro256++ (Blackman & Vigna, 2019) seeded through SplitMix64. Each
// client owns one `DiceRng` and rolls locally; the roll value is then
// broadcast as an opaque integer, so peers never need to agree on the
// generator state. Determinism still matters for tests: the same seed gives
// the same sequence of rolls on every platform.

/// Number of faces on the board's die.
pub const DIE_FACES: u64 = 6;

/// Xoshiro256++ generator used for dice rolls.
#[derive(Clone, Debug)]
pub struct DiceRng {
    s: [u64; 4],
}

impl DiceRng {
    /// Create a generator from a `u64` seed. SplitMix64 expands the seed into
    /// the 256-bit state, so nearby seeds still produce unrelated streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform integer in `[low, high)`, rejection-sampled to avoid modulo bias.
    ///
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Roll one six-sided die: a value in `1..=6`.
    pub fn roll_d6(&mut self) -> i32 {
        self.range_u64(1, DIE_FACES + 1) as i32
    }
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
