use crate::systems::{Priority, SystemSlot};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasherDefault;
use nohash_hasher::NoHashHasher;
use std::cmp::Reverse;
use std::any::TypeId;
use std::rc::Rc;

type Hasher = BuildHasherDefault<NoHashHasher<u64>>;

/// The systems registered with a world, indexed by type and ordered by priority.
#[derive(Default)]
pub(crate) struct SystemStore {
	by_type: HashMap<TypeId, Rc<SystemSlot>, Hasher>,
	by_priority: BTreeMap<Reverse<Priority>, Vec<Rc<SystemSlot>>>,
}

impl SystemStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, kind: TypeId) -> bool {
		self.by_type.contains_key(&kind)
	}

	pub fn get(&self, kind: TypeId) -> Option<Rc<SystemSlot>> {
		self.by_type.get(&kind).cloned()
	}

	pub fn len(&self) -> usize {
		self.by_type.len()
	}

	/// Register a slot. Returns `false` if a system of the same type is already present.
	pub fn link(&mut self, slot: Rc<SystemSlot>) -> bool {
		if self.by_type.contains_key(&slot.kind()) {
			return false;
		}

		slot.set_registered(true);
		self.by_priority.entry(Reverse(slot.priority())).or_default().push(slot.clone());
		self.by_type.insert(slot.kind(), slot);
		true
	}

	pub fn unlink(&mut self, kind: TypeId) -> Option<Rc<SystemSlot>> {
		let slot = self.by_type.remove(&kind)?;
		let key = Reverse(slot.priority());
		if let Some(slots) = self.by_priority.get_mut(&key) {
			slots.retain(|s| !Rc::ptr_eq(s, &slot));
			if slots.is_empty() {
				self.by_priority.remove(&key);
			}
		}

		slot.set_registered(false);
		Some(slot)
	}

	/// Every slot, highest priority first. Slots sharing a priority keep their registration order.
	pub fn slots(&self) -> Vec<Rc<SystemSlot>> {
		self.by_priority.values().flatten().cloned().collect()
	}
}
