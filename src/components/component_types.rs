use crate::components::{Component, ComponentId};
use crate::data_structures::BitField;
use std::fmt;

/// The set of component types attached to an entity, as seen by a
/// [type filter](crate::systems::TypeFilter).
#[derive(Default, Clone, PartialEq, Eq, Hash)]
pub struct ComponentTypes {
	bits: BitField,
}

impl ComponentTypes {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, id: ComponentId) {
		self.bits.set(id.value(), true);
	}

	pub fn remove(&mut self, id: ComponentId) {
		self.bits.set(id.value(), false);
	}

	pub fn contains(&self, id: ComponentId) -> bool {
		self.bits.get(id.value())
	}

	pub fn contains_type<T: Component>(&self) -> bool {
		self.contains(ComponentId::of::<T>())
	}

	pub fn len(&self) -> usize {
		self.bits.count_ones()
	}

	pub fn is_empty(&self) -> bool {
		self.bits.is_empty()
	}

	/// Iterate the contained ids in ascending order.
	pub fn iter(&self) -> impl Iterator<Item = ComponentId> + '_ {
		self.bits.ones().map(ComponentId::from_value)
	}

	pub fn bits(&self) -> &BitField {
		&self.bits
	}
}

impl FromIterator<ComponentId> for ComponentTypes {
	fn from_iter<I: IntoIterator<Item = ComponentId>>(iter: I) -> Self {
		Self {
			bits: iter.into_iter().map(|id| id.value()).collect(),
		}
	}
}

impl From<BitField> for ComponentTypes {
	fn from(bits: BitField) -> Self {
		Self { bits }
	}
}

impl fmt::Debug for ComponentTypes {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.iter()).finish()
	}
}

impl fmt::Display for ComponentTypes {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[")?;
		for (i, id) in self.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{}", id)?;
		}
		f.write_str("]")
	}
}
