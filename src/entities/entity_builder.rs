use crate::components::{Component, ComponentBundle, ComponentId, ComponentRef, ComponentSet};
use crate::entities::Entity;
use crate::error::Result;
use std::ops::Deref;

/// The batch token handed to entity initializers by
/// [World::build_entity](crate::world::World::build_entity).
///
/// While the entity has not been activated yet, structural changes made through the
/// builder skip the per-mutation system recheck; the single recheck happens when the
/// world activates the entity after the initializer returns. Once the entity is active
/// the builder behaves exactly like the plain [Entity] handle it dereferences to.
pub struct EntityBuilder {
	entity: Entity,
}

impl EntityBuilder {
	pub(crate) fn new(entity: Entity) -> Self {
		Self { entity }
	}

	/// The handle of the entity being built.
	pub fn entity(&self) -> &Entity {
		&self.entity
	}

	pub fn add<T: Component>(&self, value: T) -> Result<ComponentRef<T>> {
		let component = ComponentRef::new(value);
		self.entity.attach(component.erase(), self.recheck())?;
		Ok(component)
	}

	pub fn add_ref<T: Component>(&self, component: &ComponentRef<T>) -> Result<ComponentRef<T>> {
		self.entity.attach(component.erase(), self.recheck())?;
		Ok(component.clone())
	}

	pub fn add_shared<T: Component>(&self, other: &Entity) -> Result<ComponentRef<T>> {
		let component = self.entity.share(other, ComponentId::of::<T>(), self.recheck())?;
		self.entity.typed(component, "add shared components")
	}

	pub fn add_components<B: ComponentBundle>(&self) -> Result<()> {
		for component in B::create() {
			self.entity.attach(component, self.recheck())?;
		}
		Ok(())
	}

	pub fn add_shared_components<S: ComponentSet>(&self, other: &Entity) -> Result<()> {
		for id in S::component_ids() {
			self.entity.share(other, id, self.recheck())?;
		}
		Ok(())
	}

	pub fn remove<T: Component>(&self) -> Result<()> {
		self.entity.detach(ComponentId::of::<T>(), self.recheck())
	}

	fn recheck(&self) -> bool {
		self.entity.is_active()
	}
}

impl Deref for EntityBuilder {
	type Target = Entity;

	#[inline(always)]
	fn deref(&self) -> &Self::Target {
		&self.entity
	}
}
