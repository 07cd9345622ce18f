//! A unique runtime identifier tied to a [Component](crate::components::Component) type.
//!
//! Developers shouldn't rely on [component ids](ComponentId), as they are not stable between program re-runs.
//! They are handed out densely in first-use order, which keeps the
//! [bitfields](crate::data_structures::BitField) describing an entity's component types small.

use std::hash::BuildHasherDefault;
use nohash_hasher::NoHashHasher;
use std::collections::HashMap;
use lazy_static::lazy_static;
use crate::components::Component;
use parking_lot::Mutex;
use std::any::TypeId;
use std::fmt;

type Hasher = BuildHasherDefault<NoHashHasher<u64>>;

lazy_static! {
	static ref REGISTRY: Mutex<Registry> = Mutex::new(Registry::default());
}

#[derive(Default)]
struct Registry {
	ids: HashMap<TypeId, ComponentId, Hasher>,
	names: Vec<&'static str>,
}

/// A process-wide identifier for a type implementing the [`Component`] trait.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone)]
pub struct ComponentId {
	value: usize,
}

impl ComponentId {
	/// Get the [ComponentId] of the type `T`.
	#[inline(always)]
	pub fn of<T: Component>() -> ComponentId {
		T::component_id()
	}

	/// Look up the id of `T`, allocating the next free one on first use.
	/// This is what [`Component::component_id`] resolves to.
	pub fn register<T: 'static>() -> ComponentId {
		let mut registry = REGISTRY.lock();
		if let Some(id) = registry.ids.get(&TypeId::of::<T>()) {
			return *id;
		}

		let name = std::any::type_name::<T>();
		let id = ComponentId { value: registry.names.len() };
		registry.names.push(name);
		registry.ids.insert(TypeId::of::<T>(), id);
		log::trace!("registered component type {} as #{}", name, id.value);
		id
	}

	/// The name of the type this id was registered for.
	pub fn name(&self) -> &'static str {
		REGISTRY.lock().names.get(self.value).copied().unwrap_or("<unregistered>")
	}

	#[inline(always)]
	pub(crate) const fn from_value(value: usize) -> Self {
		Self { value }
	}

	#[inline(always)]
	pub const fn value(&self) -> usize {
		self.value
	}
}

impl fmt::Debug for ComponentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ComponentId({} {})", self.value, self.name())
	}
}

impl fmt::Display for ComponentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
