/// Counters describing how a [`Pool`] has been used.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PoolStats {
	pub created: u64,
	pub reused: u64,
	pub dropped_on_release: u64,
}

/// Free list of reusable entities.
///
/// The pool is pre-filled to `capacity`. Objects handed out while the free list
/// is empty are overflow: the matching release drops one object instead of
/// retaining it, so retained storage never grows past what was reserved and a
/// balanced acquire/release sequence leaves [`Pool::available`] where it started.
///
/// Not reentrant; only the update loop touches it.
pub struct Pool<T> {
	free: Vec<T>,
	capacity: usize,
	overflow: usize,
	create: fn() -> T,
	reset: fn(&mut T),
	stats: PoolStats,
}

impl<T> Pool<T> {
	pub fn new(capacity: usize, create: fn() -> T, reset: fn(&mut T)) -> Self {
		let mut free = Vec::with_capacity(capacity);
		free.extend((0..capacity).map(|_| create()));
		Self {
			free,
			capacity,
			overflow: 0,
			create,
			reset,
			stats: PoolStats {
				created: capacity as u64,
				..PoolStats::default()
			},
		}
	}

	pub fn acquire(&mut self) -> T {
		if let Some(item) = self.free.pop() {
			self.stats.reused += 1;
			return item;
		}
		self.overflow += 1;
		self.stats.created += 1;
		(self.create)()
	}

	pub fn release(&mut self, mut item: T) {
		if self.overflow > 0 || self.free.len() >= self.capacity {
			self.overflow = self.overflow.saturating_sub(1);
			self.stats.dropped_on_release += 1;
			return;
		}
		(self.reset)(&mut item);
		self.free.push(item);
	}

	/// Drops every retained object and forgets outstanding overflow.
	#[cfg(test)]
	pub fn clear(&mut self) {
		self.free.clear();
		self.overflow = 0;
	}

	#[cfg(test)]
	pub fn available(&self) -> usize {
		self.free.len()
	}

	#[cfg(test)]
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn stats(&self) -> &PoolStats {
		&self.stats
	}
}
