use crate::components::{Component, ComponentRef};
use crate::entities::{Entity, EntityId};
use crate::systems::SystemObserver;
use std::collections::BTreeSet;
use std::cell::RefCell;
use crate::world::World;

/// A subscription list embedded in a component, letting the component notify
/// systems when its own state changes in a meaningful way.
///
/// Subscriptions are per (system, entity) pair. Notifications reach a system
/// through [System::on_entity_modified](crate::systems::System::on_entity_modified)
/// once for every subscribed entity that is active at the time of the call.
#[derive(Default)]
pub struct Observers {
	entries: RefCell<Vec<(SystemObserver, BTreeSet<EntityId>)>>,
}

impl Observers {
	pub fn new() -> Self {
		Self::default()
	}

	/// Subscribe `observer` to changes of this component made on behalf of `entity`.
	pub fn attach(&self, observer: &SystemObserver, entity: &Entity) {
		let mut entries = self.entries.borrow_mut();
		match entries.iter_mut().find(|(o, _)| o == observer) {
			Some((_, entities)) => {
				entities.insert(entity.id());
			},
			None => entries.push((observer.clone(), BTreeSet::from([entity.id()]))),
		}
	}

	pub fn detach(&self, observer: &SystemObserver, entity: &Entity) {
		let mut entries = self.entries.borrow_mut();
		if let Some(index) = entries.iter().position(|(o, _)| o == observer) {
			entries[index].1.remove(&entity.id());
			if entries[index].1.is_empty() {
				entries.remove(index);
			}
		}
	}

	/// Drop every subscription of `observer`.
	pub fn detach_all(&self, observer: &SystemObserver) {
		self.entries.borrow_mut().retain(|(o, _)| o != observer);
	}

	pub fn is_attached(&self, observer: &SystemObserver, entity: &Entity) -> bool {
		self.entries
			.borrow()
			.iter()
			.any(|(o, entities)| o == observer && entities.contains(&entity.id()))
	}

	pub fn len(&self) -> usize {
		self.entries.borrow().iter().map(|(_, entities)| entities.len()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Report a modification to every subscribed system.
	/// Systems that have been removed and entities that are inactive are skipped.
	pub fn notify(&self) {
		let entries = self.entries.borrow().clone();
		for (observer, entities) in entries {
			let Some(slot) = observer.slot() else {
				continue;
			};
			let Some(world) = slot.world().upgrade().map(World::from_inner) else {
				continue;
			};

			for id in entities {
				if world.is_active(id) {
					slot.notify_modified(&world, id);
				}
			}
		}
	}
}

/// A [Component] that carries its own [Observers].
pub trait ObservableComponent: Component {
	fn observers(&self) -> &Observers;
}

impl<T: ObservableComponent> ComponentRef<T> {
	/// Mutate the component, then notify its observers.
	/// The component is no longer borrowed when the observers run.
	pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
		let result = f(&mut self.borrow_mut());
		self.notify();
		result
	}

	pub fn notify(&self) {
		let entries = self.borrow().observers().entries.borrow().clone();
		Observers { entries: RefCell::new(entries) }.notify();
	}
}
