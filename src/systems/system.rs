use crate::systems::{Filter, SystemObserver, SystemSlot, TypeFilter};
use crate::entities::Entity;
use crate::error::Result;
use crate::world::World;
use std::any::Any;

/// Systems with a higher priority are updated first.
/// The order of systems sharing a priority is unspecified but stable.
pub type Priority = u8;

/// Gives access to the concrete type behind a `dyn System`.
pub trait AsAny: Any {
	fn as_any(&self) -> &dyn Any;
	fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}

/// A behaviour unit subscribed to every entity whose component types pass its filter.
///
/// [priority](System::priority) and [filter](System::filter) are read once, when the
/// system is added to a [World]; they cannot change afterwards.
/// All hooks run synchronously on the thread driving the world.
pub trait System: AsAny {
	fn priority(&self) -> Priority {
		0
	}

	fn filter(&self) -> Box<dyn TypeFilter> {
		Box::new(Filter::all())
	}

	/// Called once after the system has been added, before it sees any entity.
	fn initialize(&mut self, _context: &SystemContext<'_>) -> Result<()> {
		Ok(())
	}

	/// Called once per [World::update] while the system is active.
	///
	/// The default implementation calls [update_entity](System::update_entity) for a snapshot of
	/// the suitable entities, skipping those that left the system earlier in the same pass.
	fn update(&mut self, context: &SystemContext<'_>, delta_time: f32) -> Result<()> {
		for entity in context.entities() {
			if context.contains(&entity) {
				self.update_entity(context, &entity, delta_time)?;
			}
		}
		Ok(())
	}

	fn update_entity(&mut self, _context: &SystemContext<'_>, _entity: &Entity, _delta_time: f32) -> Result<()> {
		Ok(())
	}

	/// Called once before the system is removed, after all of its entities have been removed.
	fn terminate(&mut self, _context: &SystemContext<'_>) -> Result<()> {
		Ok(())
	}

	fn on_entity_added(&mut self, _context: &SystemContext<'_>, _entity: &Entity) {}

	fn on_entity_removed(&mut self, _context: &SystemContext<'_>, _entity: &Entity) {}

	/// Called when an [observable component](crate::components::ObservableComponent)
	/// this system is attached to reports a change.
	fn on_entity_modified(&mut self, _context: &SystemContext<'_>, _entity: &Entity) {}
}

/// The view of its world a [System] gets inside its hooks.
pub struct SystemContext<'w> {
	world: &'w World,
	slot: &'w SystemSlot,
}

impl<'w> SystemContext<'w> {
	pub(crate) fn new(world: &'w World, slot: &'w SystemSlot) -> Self {
		Self { world, slot }
	}

	pub fn world(&self) -> &'w World {
		self.world
	}

	/// A snapshot of the suitable entities, in ascending id order.
	pub fn entities(&self) -> Vec<Entity> {
		self.slot.entity_ids().into_iter().map(|id| self.world.entity(id)).collect()
	}

	/// Check whether `entity` is currently in this system.
	pub fn contains(&self, entity: &Entity) -> bool {
		self.world.owns(entity) && self.slot.contains(entity.id())
	}

	pub fn number_of_entities(&self) -> usize {
		self.slot.number_of_entities()
	}

	pub fn is_active(&self) -> bool {
		self.slot.is_active()
	}

	pub fn priority(&self) -> Priority {
		self.slot.priority()
	}

	/// A token identifying this system to [observable components](crate::components::Observers).
	pub fn observer(&self) -> SystemObserver {
		self.slot.observer()
	}
}
