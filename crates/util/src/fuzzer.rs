use rand::{rngs::OsRng, Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use std::sync::{Arc, Mutex};

/// A fuzzer for generating random test text.
///
/// Uses the xoshiro256** PRNG for reproducible random sequences when seeded.
///
/// # Examples
///
/// ```
/// use dmp_util::fuzzer::Fuzzer;
///
/// let fuzzer = Fuzzer::new(Some([7u8; 32]));
/// let text = fuzzer.random_string(16, "ab\ncd \u{0680}");
/// assert_eq!(text.chars().count(), 16);
/// ```
pub struct Fuzzer {
    /// The seed used to initialize the PRNG.
    pub seed: [u8; 32],
    rng: Arc<Mutex<Xoshiro256StarStar>>,
}

impl Fuzzer {
    /// Create a new fuzzer with an optional seed.
    ///
    /// If no seed is provided, a random seed will be generated using `OsRng`.
    pub fn new(seed: Option<[u8; 32]>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            let mut bytes = [0u8; 32];
            OsRng.fill_bytes(&mut bytes);
            bytes
        });

        let rng = Xoshiro256StarStar::from_seed(seed);

        Self {
            seed,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Generate a random integer in the range [min, max] (inclusive).
    pub fn random_int(&self, min: i64, max: i64) -> i64 {
        let mut rng = self.rng.lock().unwrap();
        rng.gen_range(min..=max)
    }

    /// Pick a random element from a slice.
    pub fn pick<'a, T>(&self, elements: &'a [T]) -> &'a T {
        let mut rng = self.rng.lock().unwrap();
        let idx = rng.gen_range(0..elements.len());
        &elements[idx]
    }

    /// Generate a random boolean with the given probability of being true.
    pub fn random_bool(&self, probability: f64) -> bool {
        let mut rng = self.rng.lock().unwrap();
        rng.gen_bool(probability)
    }

    /// Generate a random string of `len` scalars drawn from `chars`.
    pub fn random_string(&self, len: usize, chars: &str) -> String {
        let chars: Vec<char> = chars.chars().collect();
        let mut rng = self.rng.lock().unwrap();
        (0..len)
            .map(|_| chars[rng.gen_range(0..chars.len())])
            .collect()
    }

    /// Mutate `text` with `edits` random single-scalar insertions and
    /// deletions, returning the drifted copy.
    pub fn mutate_string(&self, text: &str, edits: usize, chars: &str) -> String {
        let alphabet: Vec<char> = chars.chars().collect();
        let mut out: Vec<char> = text.chars().collect();
        let mut rng = self.rng.lock().unwrap();
        for _ in 0..edits {
            if !out.is_empty() && rng.gen_bool(0.5) {
                let at = rng.gen_range(0..out.len());
                out.remove(at);
            } else {
                let at = rng.gen_range(0..=out.len());
                out.insert(at, alphabet[rng.gen_range(0..alphabet.len())]);
            }
        }
        out.into_iter().collect()
    }
}
