use crate::components::{Component, ComponentBundle, ComponentId, ComponentRef, ComponentSet, ComponentTypes, ErasedComponent};
use crate::error::{ensure, violation, EcsError, Result};
use crate::world::{World, WorldInner};
use std::hash::{Hash, Hasher};
use std::rc::Weak;
use std::fmt;

/// The identifier of an entity within its [World].
pub type EntityId = u32;

/// The reserved id meaning "no entity".
pub const NO_ENTITY: EntityId = 0;

/// A lightweight handle to an entity living in a [World].
///
/// Handles are cheap to clone and own nothing: every read and write goes to the
/// world's tables. Two handles are equal when they name the same id in the same world.
/// Any operation on an entity that no longer exists fails with [EcsError::DeadEntity].
#[derive(Clone)]
pub struct Entity {
	id: EntityId,
	world: Weak<WorldInner>,
}

impl Entity {
	pub(crate) fn new(id: EntityId, world: Weak<WorldInner>) -> Self {
		Self { id, world }
	}

	#[inline(always)]
	pub fn id(&self) -> EntityId {
		self.id
	}

	/// Check whether this is the "no entity" placeholder returned by failed lookups.
	pub fn is_null(&self) -> bool {
		self.id == NO_ENTITY
	}

	pub(crate) fn world_ref(&self) -> &Weak<WorldInner> {
		&self.world
	}

	/// The world this entity belongs to, unless it has been dropped.
	pub fn world(&self) -> Option<World> {
		self.world.upgrade().map(World::from_inner)
	}

	pub fn is_existing(&self) -> bool {
		self.world().map_or(false, |world| world.is_existing(self.id))
	}

	pub fn is_active(&self) -> bool {
		self.world().map_or(false, |world| world.is_active(self.id))
	}

	pub fn name(&self) -> Result<String> {
		self.world_for("get name")?.with_attributes(self.id, "get name", |a| a.name.clone())
	}

	pub fn set_name(&self, name: impl Into<String>) -> Result<()> {
		let name = name.into();
		self.world_for("set name")?.with_attributes_mut(self.id, "set name", |a| a.name = name)
	}

	pub fn tag(&self) -> Result<String> {
		self.world_for("get tag")?.with_attributes(self.id, "get tag", |a| a.tag.clone())
	}

	pub fn set_tag(&self, tag: impl Into<String>) -> Result<()> {
		let tag = tag.into();
		self.world_for("set tag")?.with_attributes_mut(self.id, "set tag", |a| a.tag = tag)
	}

	/// Activate this entity, including it in system updates.
	pub fn activate(&self) -> Result<()> {
		self.world_for("activate")?.activate_entity(self.id)
	}

	/// Deactivate this entity, excluding it from system updates.
	pub fn deactivate(&self) -> Result<()> {
		self.world_for("deactivate")?.deactivate_entity(self.id)
	}

	/// Destroy this entity together with all of its components.
	pub fn destroy(&self) -> Result<()> {
		self.world_for("destroy")?.destroy_entity(self.id)
	}

	/// Attach a new component.
	/// Fails if a component of the same type is already attached.
	pub fn add<T: Component>(&self, value: T) -> Result<ComponentRef<T>> {
		let component = ComponentRef::new(value);
		self.attach(component.erase(), true)?;
		Ok(component)
	}

	/// Attach an already constructed, possibly shared, component.
	pub fn add_ref<T: Component>(&self, component: &ComponentRef<T>) -> Result<ComponentRef<T>> {
		self.attach(component.erase(), true)?;
		Ok(component.clone())
	}

	/// Attach the same `T` instance that `other` holds.
	pub fn add_shared<T: Component>(&self, other: &Entity) -> Result<ComponentRef<T>> {
		let component = self.share(other, ComponentId::of::<T>(), true)?;
		self.typed(component, "add shared components")
	}

	/// Attach a default-constructed component of every type in `B`.
	pub fn add_components<B: ComponentBundle>(&self) -> Result<()> {
		for component in B::create() {
			self.attach(component, true)?;
		}
		Ok(())
	}

	/// Share every component type in `S` with `other`.
	pub fn add_shared_components<S: ComponentSet>(&self, other: &Entity) -> Result<()> {
		for id in S::component_ids() {
			self.share(other, id, true)?;
		}
		Ok(())
	}

	/// Detach the component of type `T`, dropping it if no other entity holds it.
	pub fn remove<T: Component>(&self) -> Result<()> {
		self.detach(ComponentId::of::<T>(), true)
	}

	/// Detach the components of every type in `S`.
	pub fn remove_components<S: ComponentSet>(&self) -> Result<()> {
		for id in S::component_ids() {
			self.detach(id, true)?;
		}
		Ok(())
	}

	/// Detach every component, one at a time.
	pub fn remove_all_components(&self) -> Result<()> {
		self.world_for("remove components")?.remove_all_components(self.id)
	}

	/// The component of type `T`, if one is attached.
	pub fn has<T: Component>(&self) -> Result<Option<ComponentRef<T>>> {
		let component = self.erased(ComponentId::of::<T>(), "determine components")?;
		Ok(component.and_then(|c| c.downcast::<T>()))
	}

	/// The component of type `T`.
	/// Fails if none is attached.
	pub fn get<T: Component>(&self) -> Result<ComponentRef<T>> {
		match self.has::<T>()? {
			Some(component) => Ok(component),
			None => violation(EcsError::MissingComponent {
				id: self.id,
				component: ComponentId::of::<T>(),
				operation: "retrieve it",
			}),
		}
	}

	/// Check whether a `T` is attached and held by more than one entity.
	pub fn shares<T: Component>(&self) -> Result<bool> {
		let component = self.erased(ComponentId::of::<T>(), "determine shared components")?;
		Ok(component.map_or(false, |c| c.links() > 1))
	}

	pub fn components(&self) -> Result<Vec<ErasedComponent>> {
		self.world_for("retrieve components")?.components(self.id)
	}

	pub fn component_types(&self) -> Result<ComponentTypes> {
		self.world_for("determine component types")?.component_types(self.id)
	}

	pub fn number_of_components(&self) -> Result<usize> {
		self.world_for("determine number of components")?.number_of_components(self.id)
	}

	pub(crate) fn attach(&self, component: ErasedComponent, recheck: bool) -> Result<()> {
		self.world_for("add components")?.attach(self.id, component, recheck)
	}

	pub(crate) fn detach(&self, id: ComponentId, recheck: bool) -> Result<()> {
		self.world_for("remove components")?.detach(self.id, id, recheck)
	}

	pub(crate) fn share(&self, other: &Entity, id: ComponentId, recheck: bool) -> Result<ErasedComponent> {
		let world = self.world_for("add shared components")?;
		ensure!(
			world.is_existing(self.id),
			EcsError::DeadEntity { id: self.id, operation: "add shared components" }
		);
		ensure!(
			other.is_existing(),
			EcsError::DeadEntity { id: other.id, operation: "share components" }
		);
		ensure!(
			world.component(self.id, id, "add shared components")?.is_none(),
			EcsError::DuplicateComponent { id: self.id, component: id }
		);

		match other.erased(id, "share components")? {
			Some(component) => {
				world.attach(self.id, component.clone(), recheck)?;
				Ok(component)
			},
			None => violation(EcsError::ShareSourceMissingComponent {
				owner: other.id,
				target: self.id,
				component: id,
			}),
		}
	}

	pub(crate) fn typed<T: Component>(&self, component: ErasedComponent, operation: &'static str) -> Result<ComponentRef<T>> {
		match component.downcast::<T>() {
			Some(component) => Ok(component),
			None => violation(EcsError::MissingComponent {
				id: self.id,
				component: ComponentId::of::<T>(),
				operation,
			}),
		}
	}

	fn erased(&self, id: ComponentId, operation: &'static str) -> Result<Option<ErasedComponent>> {
		self.world_for(operation)?.component(self.id, id, operation)
	}

	fn world_for(&self, operation: &'static str) -> Result<World> {
		match self.world() {
			Some(world) => Ok(world),
			None => violation(EcsError::DeadEntity { id: self.id, operation }),
		}
	}
}

impl PartialEq for Entity {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id && Weak::ptr_eq(&self.world, &other.world)
	}
}

impl Eq for Entity {}

impl Hash for Entity {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state)
	}
}

impl fmt::Debug for Entity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Entity(#{})", self.id)
	}
}

impl fmt::Display for Entity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Entity #{}", self.id)?;
		match self.world().and_then(|world| world.try_name_of(self.id)) {
			Some(name) if !name.is_empty() => write!(f, " \"{}\"", name),
			_ => Ok(()),
		}
	}
}
