//! String-seeded pseudo-random stream.
//!
//! The seed string is hashed with 32-bit FNV-1a and the result drives a
//! mulberry32-style generator. The stream is identical on every platform and
//! every run for the same seed. Values are reproducible within this crate;
//! other implementations of "the same" algorithm are not guaranteed to agree
//! bit for bit.

use rand::RngCore;

const FNV_OFFSET: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;
const STREAM_INCREMENT: u32 = 0x6D2B_79F5;

/// 32-bit FNV-1a over the UTF-8 bytes of `seed`.
pub fn hash_str(seed: &str) -> u32 {
    seed.bytes().fold(FNV_OFFSET, |h, b| (h ^ b as u32).wrapping_mul(FNV_PRIME))
}

#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn from_seed_str(seed: &str) -> Self {
        Self {
            state: hash_str(seed),
        }
    }

    /// Uniform float in `[0, 1)` built from the top 24 bits of the next word.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_word() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform float in `[lo, hi)`.
    #[inline]
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        let v = lo + (hi - lo) * self.next_f32();
        // float rounding can land exactly on `hi` for wide ranges
        if v >= hi {
            lo.max(hi - (hi - lo) * f32::EPSILON)
        } else {
            v
        }
    }

    #[inline]
    fn next_word(&mut self) -> u32 {
        self.state = self.state.wrapping_add(STREAM_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.next_word()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_word() as u64;
        let lo = self.next_word() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = self.next_word().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Closure form of [`SeededRng`]: every call yields the next float in `[0, 1)`.
pub fn seeded_generator(seed: &str) -> impl FnMut() -> f32 {
    let mut rng = SeededRng::from_seed_str(seed);
    move || rng.next_f32()
}

/// Generator for one derived attribute of a record, e.g. `("abc", "color")`.
pub fn attribute_rng(id: &str, attribute: &str) -> SeededRng {
    SeededRng::from_seed_str(&format!("{id}:{attribute}"))
}
