use rand::RngCore;

const SEED_BASIS: u32 = 0xDEAD_BEEF;
const SEED_MULTIPLIER: u32 = 2_654_435_761;
const STEP: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Fold a string seed into a 32-bit generator state.
pub fn seed_hash(seed: &str) -> u32 {
    seed.chars().fold(SEED_BASIS, |acc, c| {
        (acc ^ c as u32).wrapping_mul(SEED_MULTIPLIER)
    })
}

/// Mulberry32 generator seeded from a string.
///
/// Every call site builds its own generator; two generators built from the
/// same seed yield the same stream forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: &str) -> Self {
        Self {
            state: seed_hash(seed),
        }
    }

    pub fn from_state(state: u32) -> Self {
        Self { state }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next_raw(&mut self) -> u32 {
        self.state = self.state.wrapping_add(STEP);
        let s = self.state;
        let mut t = (s ^ (s >> 15)).wrapping_mul(1 | s);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
        t ^ (t >> 14)
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.next_raw() as f64 / TWO_POW_32
    }
}

impl Iterator for Mulberry32 {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

// Lets the generator drive anything in `rand` (e.g. `SliceRandom`) while
// keeping the exact Mulberry32 sequence for `next_u32`.
impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.next_raw()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_raw() as u64;
        let lo = self.next_raw() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_raw().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
