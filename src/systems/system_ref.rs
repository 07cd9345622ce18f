use crate::systems::{Priority, System, SystemSlot, TypeFilter};
use crate::entities::Entity;
use std::cell::{Ref, RefMut};
use std::marker::PhantomData;
use crate::world::World;
use std::rc::{Rc, Weak};
use std::ops::Deref;
use std::fmt;

/// An untyped handle to a system registered with a [World].
///
/// Handles stay valid after the system is removed; they then report it as
/// inactive and without entities.
#[derive(Clone)]
pub struct SystemHandle {
	slot: Rc<SystemSlot>,
}

impl SystemHandle {
	pub(crate) fn new(slot: Rc<SystemSlot>) -> Self {
		Self { slot }
	}

	/// The type name of the system.
	pub fn name(&self) -> &'static str {
		self.slot.name()
	}

	pub fn priority(&self) -> Priority {
		self.slot.priority()
	}

	pub fn filter(&self) -> &dyn TypeFilter {
		self.slot.filter()
	}

	/// Check whether the system is still registered with its world.
	pub fn is_initialized(&self) -> bool {
		self.slot.is_registered()
	}

	/// Check whether the system takes part in [World::update].
	pub fn is_active(&self) -> bool {
		self.slot.is_active()
	}

	/// The entities currently suitable for the system, in ascending id order.
	pub fn entities(&self) -> Vec<Entity> {
		let ids = self.slot.entity_ids();
		match self.slot.world().upgrade() {
			Some(world) => {
				let world = World::from_inner(world);
				ids.into_iter().map(|id| world.entity(id)).collect()
			},
			None => Vec::new(),
		}
	}

	pub fn number_of_entities(&self) -> usize {
		self.slot.number_of_entities()
	}

	pub fn contains(&self, entity: &Entity) -> bool {
		Weak::ptr_eq(self.slot.world(), entity.world_ref()) && self.slot.contains(entity.id())
	}

	pub fn observer(&self) -> SystemObserver {
		self.slot.observer()
	}
}

impl fmt::Debug for SystemHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SystemHandle")
			.field("name", &self.name())
			.field("priority", &self.priority())
			.field("active", &self.is_active())
			.field("entities", &self.number_of_entities())
			.finish()
	}
}

/// A typed handle to a system of type `S`, giving access to its state.
pub struct SystemRef<S: System> {
	handle: SystemHandle,
	marker: PhantomData<fn() -> S>,
}

impl<S: System> SystemRef<S> {
	pub(crate) fn new(slot: Rc<SystemSlot>) -> Self {
		Self {
			handle: SystemHandle::new(slot),
			marker: PhantomData,
		}
	}

	/// Immutably borrow the system.
	///
	/// # Panics
	/// Panics if one of the system's hooks is running.
	pub fn borrow(&self) -> Ref<'_, S> {
		Ref::map(self.handle.slot.behavior().borrow(), |system| {
			SystemSlot::downcast_ref::<S>(&**system).expect("system slot holds a different type")
		})
	}

	/// Mutably borrow the system.
	///
	/// # Panics
	/// Panics if the system is borrowed or one of its hooks is running.
	pub fn borrow_mut(&self) -> RefMut<'_, S> {
		RefMut::map(self.handle.slot.behavior().borrow_mut(), |system| {
			SystemSlot::downcast_mut::<S>(&mut **system).expect("system slot holds a different type")
		})
	}

	pub fn handle(&self) -> &SystemHandle {
		&self.handle
	}
}

impl<S: System> Clone for SystemRef<S> {
	fn clone(&self) -> Self {
		Self {
			handle: self.handle.clone(),
			marker: PhantomData,
		}
	}
}

impl<S: System> Deref for SystemRef<S> {
	type Target = SystemHandle;

	#[inline(always)]
	fn deref(&self) -> &Self::Target {
		&self.handle
	}
}

impl<S: System> fmt::Debug for SystemRef<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&self.handle, f)
	}
}

/// Identifies a system to the [observable components](crate::components::Observers)
/// it subscribes to. Holding an observer does not keep the system alive.
#[derive(Clone)]
pub struct SystemObserver {
	slot: Weak<SystemSlot>,
}

impl SystemObserver {
	pub(crate) fn new(slot: Weak<SystemSlot>) -> Self {
		Self { slot }
	}

	pub(crate) fn slot(&self) -> Option<Rc<SystemSlot>> {
		self.slot.upgrade()
	}
}

impl PartialEq for SystemObserver {
	fn eq(&self, other: &Self) -> bool {
		Weak::ptr_eq(&self.slot, &other.slot)
	}
}

impl Eq for SystemObserver {}

impl fmt::Debug for SystemObserver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.slot.upgrade() {
			Some(slot) => write!(f, "SystemObserver({})", slot.name()),
			None => f.write_str("SystemObserver(<removed>)"),
		}
	}
}
