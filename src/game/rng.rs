//! Random streams for game simulation. `Rng` is SplitMix64: fast, deterministic for a given
//! seed, not cryptographically secure. Each simulation run or shard owns its stream.

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

/// 2^-53, the spacing of the f64 values produced by [RandomSource::next_f64].
const UNIT_SCALE: f64 = 1.0 / (1u64 << 53) as f64;

/// A stream of random draws consumed by the at-bat sampler and the fielding model.
pub trait RandomSource {
    fn next_u64(&mut self) -> u64;

    /// Uniform draw in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * UNIT_SCALE
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_u64(&mut self) -> u64 {
        (**self).next_u64()
    }

    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seeded from the operating system; see [entropy_seed].
    pub fn from_entropy() -> Self {
        Self::new(entropy_seed())
    }

    /// Independent stream for shard `stream` of a run seeded with `seed`.
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        let mut mixer = Rng::new(seed ^ stream.wrapping_mul(SPLITMIX64_M2));
        Self::new(mixer.next_u64())
    }
}

impl RandomSource for Rng {
    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX64_GOLDEN);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
        z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
        z ^ (z >> 31)
    }
}

/// Pick an index with probability proportional to `weights[i]`, using one uniform draw.
///
/// Non-positive and non-finite weights never win. Returns `None` (without drawing) when no
/// weight is positive.
pub fn weighted_index<R: RandomSource + ?Sized>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    let usable = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let total: f64 = weights.iter().copied().map(usable).sum();
    if total <= 0.0 {
        return None;
    }

    let target = rng.next_f64() * total;
    let mut acc = 0.0;
    let mut last_positive = None;
    for (i, w) in weights.iter().copied().map(usable).enumerate() {
        if w == 0.0 {
            continue;
        }
        acc += w;
        if target < acc {
            return Some(i);
        }
        last_positive = Some(i);
    }
    // Rounding in the running sum can leave target just above acc.
    last_positive
}

/// 64 bits from the OS entropy source. Falls back to a clock-derived value if that fails.
pub fn entropy_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(err) => {
            tracing::warn!("entropy source unavailable ({err}), seeding from the clock");
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0);
            Rng::new(nanos ^ u64::from(std::process::id())).next_u64()
        }
    }
}
