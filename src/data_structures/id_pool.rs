use crate::data_structures::BitField;
use crate::entities::{EntityId, NO_ENTITY};
use crate::error::{ensure, EcsError, Result};

/// The number of ids a pool is prepared for when no capacity is given.
pub const DEFAULT_POOL_CAPACITY: usize = 1000;

/// Hands out small, dense, non-zero identifiers and recycles released ones.
///
/// Released ids are reused most-recently-released first, so the pool only
/// grows when every previously issued id is still in use.
pub struct IdPool {
	initial_capacity: usize,
	next_id: EntityId,
	reusable: Vec<EntityId>,
	existing: BitField,
	count: usize,
}

impl IdPool {
	pub fn new() -> Self {
		Self::with_capacity(DEFAULT_POOL_CAPACITY)
	}

	/// Create a pool prepared for `capacity` concurrently existing ids.
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			initial_capacity: capacity,
			next_id: NO_ENTITY + 1,
			reusable: Vec::new(),
			existing: BitField::with_capacity(capacity + 1),
			count: 0,
		}
	}

	/// Acquire an id, preferring the most recently released one.
	pub fn acquire(&mut self) -> EntityId {
		let id = match self.reusable.pop() {
			Some(id) => id,
			None => {
				let id = self.next_id;
				self.next_id += 1;
				id
			},
		};

		self.existing.set(id as usize, true);
		self.count += 1;
		id
	}

	/// Announce that `count` more ids are about to be acquired.
	pub fn require(&mut self, count: usize) {
		let fresh = count.saturating_sub(self.reusable.len());
		self.existing.ensure_capacity(self.next_id as usize + fresh);
	}

	/// Release an existing id, making it available for reuse.
	/// Releasing an id that does not currently exist is an error.
	pub fn release(&mut self, id: EntityId) -> Result<()> {
		ensure!(
			self.exists(id),
			EcsError::DeadEntity { id, operation: "release its id" }
		);

		self.existing.set(id as usize, false);
		self.reusable.push(id);
		self.count -= 1;
		Ok(())
	}

	pub fn exists(&self, id: EntityId) -> bool {
		id != NO_ENTITY && self.existing.get(id as usize)
	}

	/// The number of currently existing ids.
	pub fn count(&self) -> usize {
		self.count
	}

	/// The number of ids the existence table can hold without growing.
	pub fn capacity(&self) -> usize {
		self.existing.capacity().saturating_sub(1)
	}

	/// Release every id and return to the pool's initial configuration.
	pub fn clear(&mut self) {
		self.next_id = NO_ENTITY + 1;
		self.reusable.clear();
		self.existing = BitField::with_capacity(self.initial_capacity + 1);
		self.count = 0;
	}
}

impl Default for IdPool {
	fn default() -> Self {
		Self::new()
	}
}
