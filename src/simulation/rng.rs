// Seeded PRNG so a run is reproducible from its seed. Not cryptographically secure.

#[derive(Debug, Clone)]
pub struct Prng {
	state: u64,
}

impl Prng {
	pub fn new(seed: u64) -> Self {
		// Avoid a zero state.
		let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
		Self { state: seed }
	}

	#[inline]
	fn next_u64(&mut self) -> u64 {
		// xorshift64*
		let mut x = self.state;
		x ^= x >> 12;
		x ^= x << 25;
		x ^= x >> 27;
		self.state = x;
		x.wrapping_mul(0x2545F4914F6CDD1D)
	}

	/// Uniform in `[0, 1)`.
	#[inline]
	pub fn next_f64(&mut self) -> f64 {
		(self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
	}

	/// Uniform in `[low, high)`; returns `low` for an empty or inverted range.
	#[inline]
	pub fn range(&mut self, low: f64, high: f64) -> f64 {
		if high <= low {
			return low;
		}
		low + (high - low) * self.next_f64()
	}

	/// Uniform index in `[0, len)`, or `None` when `len == 0`.
	#[inline]
	pub fn index(&mut self, len: usize) -> Option<usize> {
		if len == 0 {
			return None;
		}
		Some((self.next_u64() % len as u64) as usize)
	}

	pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
		self.index(items.len()).map(|i| &items[i])
	}
}
