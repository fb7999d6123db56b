use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const CODE_LEN: usize = 6;

/// Verification code source, seeded once at startup.
///
/// Characters are drawn uniformly from `[A-Z0-9]`. The generator is not
/// reseeded from the OS and codes only prove possession of a mailbox for a
/// few minutes, so they must not be reused as secrets anywhere else.
pub struct CodeGenerator {
    rng: Mutex<StdRng>,
}

impl CodeGenerator {
    pub fn from_entropy() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    pub fn generate(&self) -> String {
        let mut rng = self.rng.lock();
        (0..CODE_LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}
