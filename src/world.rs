//! The [World] owns every entity, component and system and keeps the systems'
//! views of the entities consistent with the entities' component types.

use crate::components::{ComponentBundle, ComponentId, ComponentTypes, ErasedComponent};
use crate::entities::{Attributes, Entity, EntityBuilder, EntityId, NO_ENTITY};
use crate::data_structures::{IdPool, DEFAULT_POOL_CAPACITY};
use crate::systems::{System, SystemHandle, SystemRef, SystemSlot, SystemStore};
use crate::error::{ensure, violation, EcsError, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::BuildHasherDefault;
use nohash_hasher::NoHashHasher;
use std::rc::{Rc, Weak};
use std::cell::{Cell, RefCell};
use std::any::TypeId;
use std::fmt;

type Hasher = BuildHasherDefault<NoHashHasher<EntityId>>;

/// Construction parameters of a [World].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldConfig {
	pub name: String,
	/// The number of entities the id pool is prepared for up front.
	pub initial_capacity: usize,
}

impl WorldConfig {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
		self.initial_capacity = initial_capacity;
		self
	}
}

impl Default for WorldConfig {
	fn default() -> Self {
		Self {
			name: String::from("World"),
			initial_capacity: DEFAULT_POOL_CAPACITY,
		}
	}
}

pub(crate) struct WorldInner {
	name: String,
	ids: RefCell<IdPool>,
	entities: RefCell<BTreeSet<EntityId>>,
	attributes: RefCell<HashMap<EntityId, Attributes, Hasher>>,
	components: RefCell<HashMap<EntityId, BTreeMap<ComponentId, ErasedComponent>, Hasher>>,
	systems: RefCell<SystemStore>,
	spawned: Cell<u64>,
}

/// A container of entities and the systems operating on them.
///
/// `World` is a cheap handle: clones refer to the same world. The world is cleared,
/// systems first, when the last handle is dropped. [Entity] handles do not keep it alive.
///
/// No table borrow is ever held while a system hook runs, so hooks are free to
/// call back into the world, including creating and destroying entities.
#[derive(Clone)]
pub struct World {
	inner: Rc<WorldInner>,
}

impl World {
	pub fn new(name: impl Into<String>) -> Self {
		Self::with_config(WorldConfig::new(name))
	}

	pub fn with_config(config: WorldConfig) -> Self {
		log::trace!("constructing world \"{}\"", config.name);
		Self {
			inner: Rc::new(WorldInner {
				name: config.name,
				ids: RefCell::new(IdPool::with_capacity(config.initial_capacity)),
				entities: RefCell::new(BTreeSet::new()),
				attributes: RefCell::new(HashMap::default()),
				components: RefCell::new(HashMap::default()),
				systems: RefCell::new(SystemStore::new()),
				spawned: Cell::new(0),
			}),
		}
	}

	pub fn name(&self) -> &str {
		&self.inner.name
	}

	/// Run one frame: every active system's [update](System::update), highest priority first.
	/// Stops at the first system returning an error.
	pub fn update(&self, delta_time: f32) -> Result<()> {
		let slots = self.inner.systems.borrow().slots();
		for slot in slots {
			if slot.is_active() {
				slot.update(self, delta_time)?;
			}
		}
		Ok(())
	}

	/// Remove every system, then every entity.
	pub fn clear(&self) {
		log::debug!("clearing world \"{}\"", self.name());
		self.remove_all_systems();
		self.remove_all_entities();
		self.inner.ids.borrow_mut().clear();
	}

	// Entities

	/// Create an active entity without components.
	pub fn create_entity(&self, name: impl Into<String>) -> Entity {
		let entity = self.spawn(name.into());
		self.enable(entity.id());
		entity
	}

	/// Create an entity and let `init` attach its components before any system sees it.
	///
	/// Systems are checked once, after `init` returns. If `init` fails, the entity
	/// is destroyed and the error returned.
	pub fn build_entity<F>(&self, name: impl Into<String>, init: F) -> Result<Entity>
	where
		F: FnOnce(&EntityBuilder) -> Result<()>,
	{
		let builder = EntityBuilder::new(self.spawn(name.into()));
		let id = builder.entity().id();
		let generation = self.generation(id);
		if let Err(error) = init(&builder) {
			self.discard(id, generation);
			return Err(error);
		}

		// The initializer may have destroyed the entity and handed its id to another.
		if self.generation(id) == generation {
			self.enable(id);
		}
		Ok(builder.entity().clone())
	}

	/// Create an entity with a default-constructed component of every type in `B`.
	pub fn create_entity_with<B: ComponentBundle>(&self, name: impl Into<String>) -> Result<Entity> {
		self.build_entity(name, |entity| entity.add_components::<B>())
	}

	/// Create `count` entities without components.
	/// A non-empty `prefix` names them `prefix0`, `prefix1` and so on.
	pub fn create_entities(&self, count: usize, prefix: &str) -> Vec<Entity> {
		self.inner.ids.borrow_mut().require(count);
		let entities = (0..count).map(|i| self.create_entity(Self::indexed_name(prefix, i))).collect();
		log::debug!("created {} entities in world \"{}\"", count, self.name());
		entities
	}

	/// Create `count` entities, running `init` for each as [build_entity](World::build_entity) does.
	/// Stops at the first failing initializer.
	pub fn build_entities<F>(&self, count: usize, prefix: &str, mut init: F) -> Result<Vec<Entity>>
	where
		F: FnMut(&EntityBuilder) -> Result<()>,
	{
		self.inner.ids.borrow_mut().require(count);
		let mut entities = Vec::with_capacity(count);
		for i in 0..count {
			entities.push(self.build_entity(Self::indexed_name(prefix, i), &mut init)?);
		}
		log::debug!("built {} entities in world \"{}\"", count, self.name());
		Ok(entities)
	}

	pub fn create_entities_with<B: ComponentBundle>(&self, count: usize, prefix: &str) -> Result<Vec<Entity>> {
		self.build_entities(count, prefix, |entity| entity.add_components::<B>())
	}

	/// Destroy an entity: it leaves every system, loses its components one at a time,
	/// and its id becomes available for reuse.
	pub fn destroy_entity(&self, id: EntityId) -> Result<()> {
		ensure!(
			self.is_existing(id),
			EcsError::DeadEntity { id, operation: "destroy it" }
		);

		log::trace!("destroying {}", self.entity(id));
		let generation = self.generation(id);
		self.deactivate_entity(id)?;
		if self.generation(id) != generation {
			return Ok(());
		}

		self.remove_all_components(id)?;
		if self.generation(id) != generation {
			return Ok(());
		}

		// A removal callback may have reactivated it.
		self.deactivate_entity(id)?;
		self.erase(id)
	}

	/// Destroy every entity in `entities` that still exists, returning how many were destroyed.
	/// Entities destroyed as a side effect of destroying an earlier one are skipped.
	pub fn destroy_entities(&self, entities: &[Entity]) -> Result<usize> {
		let mut destroyed = 0;
		for entity in entities {
			if entity.is_existing() && self.owns(entity) {
				self.destroy_entity(entity.id())?;
				destroyed += 1;
			}
		}
		Ok(destroyed)
	}

	pub fn remove_all_entities(&self) {
		loop {
			let next = self.inner.entities.borrow().iter().next().copied();
			let Some(id) = next else {
				break;
			};

			if let Err(error) = self.destroy_entity(id) {
				log::warn!("failed to destroy entity #{} while clearing: {}", id, error);
				if let Err(error) = self.erase(id) {
					log::warn!("dropping the records of entity #{} anyway: {}", id, error);
				}
			}
		}
	}

	pub fn activate_entity(&self, id: EntityId) -> Result<()> {
		self.set_entity_active(id, true, "activate it")
	}

	pub fn deactivate_entity(&self, id: EntityId) -> Result<()> {
		self.set_entity_active(id, false, "deactivate it")
	}

	pub fn is_existing(&self, id: EntityId) -> bool {
		self.inner.ids.borrow().exists(id)
	}

	pub fn is_active(&self, id: EntityId) -> bool {
		self.inner.attributes.borrow().get(&id).map_or(false, |a| a.active)
	}

	/// A handle for `id`. The id is not validated; operations on the handle are.
	pub fn entity(&self, id: EntityId) -> Entity {
		Entity::new(id, Rc::downgrade(&self.inner))
	}

	/// Every existing entity, in ascending id order.
	pub fn entities(&self) -> Vec<Entity> {
		let ids: Vec<EntityId> = self.inner.entities.borrow().iter().copied().collect();
		ids.into_iter().map(|id| self.entity(id)).collect()
	}

	pub fn number_of_entities(&self) -> usize {
		self.inner.entities.borrow().len()
	}

	// Lookup

	/// The first entity, by id, whose attributes satisfy `predicate`,
	/// or the null entity if none does.
	pub fn find_entity_by<P>(&self, predicate: P) -> Entity
	where
		P: Fn(&Attributes) -> bool,
	{
		let found = self.scan(predicate, true);
		self.entity(found.first().copied().unwrap_or(NO_ENTITY))
	}

	/// Every entity whose attributes satisfy `predicate`, in ascending id order.
	pub fn find_entities_by<P>(&self, predicate: P) -> Vec<Entity>
	where
		P: Fn(&Attributes) -> bool,
	{
		self.scan(predicate, false).into_iter().map(|id| self.entity(id)).collect()
	}

	pub fn find_entity(&self, name: &str) -> Entity {
		self.find_entity_by(|a| a.name == name)
	}

	pub fn find_entities(&self, name: &str) -> Vec<Entity> {
		self.find_entities_by(|a| a.name == name)
	}

	pub fn find_entities_starting_with(&self, prefix: &str) -> Vec<Entity> {
		self.find_entities_by(|a| a.name.starts_with(prefix))
	}

	pub fn find_entities_ending_with(&self, suffix: &str) -> Vec<Entity> {
		self.find_entities_by(|a| a.name.ends_with(suffix))
	}

	pub fn find_entity_tagged(&self, tag: &str) -> Entity {
		self.find_entity_by(|a| a.tag == tag)
	}

	pub fn find_entities_tagged(&self, tag: &str) -> Vec<Entity> {
		self.find_entities_by(|a| a.tag == tag)
	}

	pub fn find_entities_tagged_starting_with(&self, prefix: &str) -> Vec<Entity> {
		self.find_entities_by(|a| a.tag.starts_with(prefix))
	}

	pub fn find_entities_tagged_ending_with(&self, suffix: &str) -> Vec<Entity> {
		self.find_entities_by(|a| a.tag.ends_with(suffix))
	}

	// Systems

	/// Register `system`, initialize it and subscribe it to every suitable entity.
	pub fn add<S: System>(&self, system: S) -> Result<SystemRef<S>> {
		let name = std::any::type_name::<S>();
		ensure!(
			!self.has::<S>(),
			EcsError::DuplicateSystem { system: name, world: self.inner.name.clone() }
		);

		let slot = SystemSlot::new(system, Rc::downgrade(&self.inner));
		log::trace!("adding system {} with priority {} ({})", slot, slot.priority(), slot.filter().describe());
		self.inner.systems.borrow_mut().link(slot.clone());

		if let Err(error) = slot.initialize(self) {
			log::warn!("system {} failed to initialize: {}", slot, error);
			self.inner.systems.borrow_mut().unlink(slot.kind());
			return Err(error);
		}

		let ids: Vec<EntityId> = self.inner.entities.borrow().iter().copied().collect();
		for id in ids {
			slot.check(self, id);
		}

		slot.set_active(true);
		Ok(SystemRef::new(slot))
	}

	/// Unsubscribe the system of type `S` from all of its entities, terminate and unregister it.
	pub fn remove<S: System>(&self) -> Result<()> {
		let slot = self.slot::<S>("remove it")?;
		self.remove_slot(&slot);
		Ok(())
	}

	pub fn has<S: System>(&self) -> bool {
		self.inner.systems.borrow().contains(TypeId::of::<S>())
	}

	pub fn get<S: System>(&self) -> Result<SystemRef<S>> {
		Ok(SystemRef::new(self.slot::<S>("retrieve it")?))
	}

	/// Resume [update](System::update) calls for the system of type `S`.
	pub fn activate<S: System>(&self) -> Result<()> {
		let slot = self.slot::<S>("activate it")?;
		log::trace!("activating system {}", slot);
		slot.set_active(true);
		Ok(())
	}

	/// Suspend [update](System::update) calls for the system of type `S`.
	/// Its set of entities keeps tracking membership while deactivated.
	pub fn deactivate<S: System>(&self) -> Result<()> {
		let slot = self.slot::<S>("deactivate it")?;
		log::trace!("deactivating system {}", slot);
		slot.set_active(false);
		Ok(())
	}

	/// Every registered system, highest priority first.
	pub fn systems(&self) -> Vec<SystemHandle> {
		self.inner.systems.borrow().slots().into_iter().map(SystemHandle::new).collect()
	}

	pub fn number_of_systems(&self) -> usize {
		self.inner.systems.borrow().len()
	}

	/// Remove every system, lowest priority first.
	pub fn remove_all_systems(&self) {
		loop {
			let next = self.inner.systems.borrow().slots().pop();
			match next {
				Some(slot) => self.remove_slot(&slot),
				None => break,
			}
		}
	}

	// Crate internals used by the entity handles

	pub(crate) fn from_inner(inner: Rc<WorldInner>) -> Self {
		Self { inner }
	}

	/// Check whether two handles refer to the same world.
	pub fn ptr_eq(&self, other: &World) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}

	pub(crate) fn owns(&self, entity: &Entity) -> bool {
		Weak::ptr_eq(&Rc::downgrade(&self.inner), entity.world_ref())
	}

	pub(crate) fn with_attributes<R>(&self, id: EntityId, operation: &'static str, f: impl FnOnce(&Attributes) -> R) -> Result<R> {
		match self.inner.attributes.borrow().get(&id) {
			Some(attributes) => Ok(f(attributes)),
			None => violation(EcsError::DeadEntity { id, operation }),
		}
	}

	pub(crate) fn with_attributes_mut<R>(&self, id: EntityId, operation: &'static str, f: impl FnOnce(&mut Attributes) -> R) -> Result<R> {
		match self.inner.attributes.borrow_mut().get_mut(&id) {
			Some(attributes) => Ok(f(attributes)),
			None => violation(EcsError::DeadEntity { id, operation }),
		}
	}

	/// The entity's name, or `None` if it does not exist or its attributes are being written.
	pub(crate) fn try_name_of(&self, id: EntityId) -> Option<String> {
		let attributes = self.inner.attributes.try_borrow().ok()?;
		attributes.get(&id).map(|a| a.name.clone())
	}

	pub(crate) fn attach(&self, id: EntityId, component: ErasedComponent, recheck: bool) -> Result<()> {
		let component_id = component.component_id();
		{
			let mut components = self.inner.components.borrow_mut();
			let Some(bucket) = components.get_mut(&id) else {
				return violation(EcsError::DeadEntity { id, operation: "add components" });
			};
			if bucket.contains_key(&component_id) {
				return violation(EcsError::DuplicateComponent { id, component: component_id });
			}

			component.link();
			bucket.insert(component_id, component);
		}

		log::trace!("added component {} to {}", component_id, self.entity(id));
		if recheck {
			self.check_systems(id);
		}
		Ok(())
	}

	pub(crate) fn detach(&self, id: EntityId, component_id: ComponentId, recheck: bool) -> Result<()> {
		let removed = {
			let mut components = self.inner.components.borrow_mut();
			let Some(bucket) = components.get_mut(&id) else {
				return violation(EcsError::DeadEntity { id, operation: "remove components" });
			};
			match bucket.remove(&component_id) {
				Some(component) => component,
				None => {
					return violation(EcsError::MissingComponent {
						id,
						component: component_id,
						operation: "remove it",
					});
				},
			}
		};

		removed.unlink();
		log::trace!("removed component {} from {}", component_id, self.entity(id));
		if recheck {
			self.check_systems(id);
		}

		// The instance is dropped here, after the systems have seen the removal.
		drop(removed);
		Ok(())
	}

	pub(crate) fn component(&self, id: EntityId, component_id: ComponentId, operation: &'static str) -> Result<Option<ErasedComponent>> {
		match self.inner.components.borrow().get(&id) {
			Some(bucket) => Ok(bucket.get(&component_id).cloned()),
			None => violation(EcsError::DeadEntity { id, operation }),
		}
	}

	pub(crate) fn components(&self, id: EntityId) -> Result<Vec<ErasedComponent>> {
		match self.inner.components.borrow().get(&id) {
			Some(bucket) => Ok(bucket.values().cloned().collect()),
			None => violation(EcsError::DeadEntity { id, operation: "retrieve components" }),
		}
	}

	pub(crate) fn component_types(&self, id: EntityId) -> Result<ComponentTypes> {
		match self.inner.components.borrow().get(&id) {
			Some(bucket) => Ok(bucket.keys().copied().collect()),
			None => violation(EcsError::DeadEntity { id, operation: "determine component types" }),
		}
	}

	/// The component types of `id`, empty if it does not exist.
	pub(crate) fn component_types_of(&self, id: EntityId) -> ComponentTypes {
		match self.inner.components.borrow().get(&id) {
			Some(bucket) => bucket.keys().copied().collect(),
			None => ComponentTypes::new(),
		}
	}

	pub(crate) fn number_of_components(&self, id: EntityId) -> Result<usize> {
		match self.inner.components.borrow().get(&id) {
			Some(bucket) => Ok(bucket.len()),
			None => violation(EcsError::DeadEntity { id, operation: "determine number of components" }),
		}
	}

	/// Detach every component of `id`, one at a time, each followed by a recheck.
	pub(crate) fn remove_all_components(&self, id: EntityId) -> Result<()> {
		let generation = self.generation(id);
		for component_id in self.component_types(id)?.iter() {
			if self.generation(id) != generation {
				break;
			}
			if self.component(id, component_id, "remove components")?.is_some() {
				self.detach(id, component_id, true)?;
			}
		}
		Ok(())
	}

	/// Bring every system's membership of `id` up to date, highest priority first.
	pub(crate) fn check_systems(&self, id: EntityId) {
		log::trace!("checking systems for entity #{}", id);
		let slots = self.inner.systems.borrow().slots();
		for slot in slots {
			slot.check(self, id);
		}
	}

	// Private helpers

	/// Acquire an id and create the inactive, empty entity record.
	fn spawn(&self, name: String) -> Entity {
		let id = self.inner.ids.borrow_mut().acquire();
		let generation = self.inner.spawned.get() + 1;
		self.inner.spawned.set(generation);
		self.inner.attributes.borrow_mut().insert(id, Attributes::new(name, generation));
		self.inner.components.borrow_mut().insert(id, BTreeMap::new());
		self.inner.entities.borrow_mut().insert(id);

		let entity = self.entity(id);
		log::trace!("created {}", entity);
		entity
	}

	fn enable(&self, id: EntityId) {
		if let Err(error) = self.activate_entity(id) {
			log::warn!("failed to activate new entity #{}: {}", id, error);
		}
	}

	/// Destroy an entity that failed to build, or could not be destroyed normally.
	fn discard(&self, id: EntityId, generation: Option<u64>) {
		if self.generation(id) != generation {
			return;
		}
		if let Err(error) = self.destroy_entity(id) {
			log::warn!("failed to discard entity #{}: {}", id, error);
		}
	}

	/// The spawn counter of whichever entity currently holds `id`, if any.
	fn generation(&self, id: EntityId) -> Option<u64> {
		self.inner.attributes.borrow().get(&id).map(|a| a.generation)
	}

	/// Remove the entity's records from every table and release its id.
	fn erase(&self, id: EntityId) -> Result<()> {
		let components = self.inner.components.borrow_mut().remove(&id);
		self.inner.attributes.borrow_mut().remove(&id);
		self.inner.entities.borrow_mut().remove(&id);

		if let Some(components) = &components {
			components.values().for_each(ErasedComponent::unlink);
		}

		let released = self.inner.ids.borrow_mut().release(id);
		log::trace!("destroyed entity #{}", id);
		drop(components);
		released
	}

	fn set_entity_active(&self, id: EntityId, active: bool, operation: &'static str) -> Result<()> {
		let changed = self.with_attributes_mut(id, operation, |attributes| {
			let changed = attributes.active != active;
			attributes.active = active;
			changed
		})?;

		if changed {
			match active {
				true => log::trace!("activated {}", self.entity(id)),
				false => log::trace!("deactivated {}", self.entity(id)),
			}
			self.check_systems(id);
		}
		Ok(())
	}

	fn scan<P>(&self, predicate: P, first: bool) -> Vec<EntityId>
	where
		P: Fn(&Attributes) -> bool,
	{
		let entities = self.inner.entities.borrow();
		let attributes = self.inner.attributes.borrow();
		let mut matches = entities
			.iter()
			.filter(|id| attributes.get(*id).map_or(false, &predicate))
			.copied();

		match first {
			true => matches.next().into_iter().collect(),
			false => matches.collect(),
		}
	}

	fn slot<S: System>(&self, operation: &'static str) -> Result<Rc<SystemSlot>> {
		match self.inner.systems.borrow().get(TypeId::of::<S>()) {
			Some(slot) => Ok(slot),
			None => violation(EcsError::MissingSystem {
				system: std::any::type_name::<S>(),
				world: self.inner.name.clone(),
				operation,
			}),
		}
	}

	fn remove_slot(&self, slot: &Rc<SystemSlot>) {
		log::trace!("removing system {}", slot);
		slot.set_active(false);
		slot.set_registered(false);
		slot.remove_all_entities(self);

		if let Err(error) = slot.terminate(self) {
			log::warn!("system {} failed to terminate: {}", slot, error);
		}

		self.inner.systems.borrow_mut().unlink(slot.kind());
	}

	fn indexed_name(prefix: &str, index: usize) -> String {
		match prefix.is_empty() {
			true => String::new(),
			false => format!("{}{}", prefix, index),
		}
	}
}

impl Default for World {
	fn default() -> Self {
		Self::with_config(WorldConfig::default())
	}
}

impl Drop for World {
	fn drop(&mut self) {
		if Rc::strong_count(&self.inner) == 1 {
			self.clear();
			log::trace!("destroyed world \"{}\"", self.name());
		}
	}
}

impl fmt::Display for World {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "\"{}\"", self.name())
	}
}

impl fmt::Debug for World {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("World")
			.field("name", &self.name())
			.field("entities", &self.number_of_entities())
			.field("systems", &self.number_of_systems())
			.finish()
	}
}
