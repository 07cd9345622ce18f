use crate::systems::{AsAny, Priority, System, SystemContext, TypeFilter};
use std::collections::{BTreeSet, VecDeque};
use crate::entities::{Entity, EntityId};
use crate::world::{World, WorldInner};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use crate::error::Result;
use std::any::TypeId;
use std::fmt;

/// A membership notification waiting for its system's hook to become free.
pub(crate) enum Event {
	Added(Entity),
	Removed(Entity),
	Modified(Entity),
	Terminated,
}

/// The world's registration record for one system: the user's behaviour plus the
/// bookkeeping the world maintains on its behalf.
pub(crate) struct SystemSlot {
	me: Weak<SystemSlot>,
	world: Weak<WorldInner>,
	kind: TypeId,
	name: &'static str,
	priority: Priority,
	filter: Box<dyn TypeFilter>,
	registered: Cell<bool>,
	active: Cell<bool>,
	entities: RefCell<BTreeSet<EntityId>>,
	pending: RefCell<VecDeque<Event>>,
	behavior: RefCell<Box<dyn System>>,
}

impl SystemSlot {
	pub fn new<S: System>(system: S, world: Weak<WorldInner>) -> Rc<Self> {
		let priority = system.priority();
		let filter = system.filter();

		Rc::new_cyclic(|me| Self {
			me: me.clone(),
			world,
			kind: TypeId::of::<S>(),
			name: std::any::type_name::<S>(),
			priority,
			filter,
			registered: Cell::new(false),
			active: Cell::new(false),
			entities: RefCell::new(BTreeSet::new()),
			pending: RefCell::new(VecDeque::new()),
			behavior: RefCell::new(Box::new(system)),
		})
	}

	pub fn kind(&self) -> TypeId {
		self.kind
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn priority(&self) -> Priority {
		self.priority
	}

	pub fn filter(&self) -> &dyn TypeFilter {
		self.filter.as_ref()
	}

	pub fn world(&self) -> &Weak<WorldInner> {
		&self.world
	}

	pub fn behavior(&self) -> &RefCell<Box<dyn System>> {
		&self.behavior
	}

	pub fn downcast_ref<'a, S: System>(behavior: &'a (dyn System + 'static)) -> Option<&'a S> {
		AsAny::as_any(behavior).downcast_ref::<S>()
	}

	pub fn downcast_mut<'a, S: System>(behavior: &'a mut (dyn System + 'static)) -> Option<&'a mut S> {
		AsAny::as_any_mut(behavior).downcast_mut::<S>()
	}

	pub fn is_registered(&self) -> bool {
		self.registered.get()
	}

	pub fn set_registered(&self, registered: bool) {
		self.registered.set(registered);
	}

	pub fn is_active(&self) -> bool {
		self.registered.get() && self.active.get()
	}

	pub fn set_active(&self, active: bool) {
		self.active.set(active);
	}

	pub fn contains(&self, id: EntityId) -> bool {
		self.entities.borrow().contains(&id)
	}

	pub fn entity_ids(&self) -> Vec<EntityId> {
		self.entities.borrow().iter().copied().collect()
	}

	pub fn number_of_entities(&self) -> usize {
		self.entities.borrow().len()
	}

	pub fn observer(&self) -> crate::systems::SystemObserver {
		crate::systems::SystemObserver::new(self.me.clone())
	}

	/// Bring this system's membership of `id` in line with the entity's current state.
	/// Callbacks fire only on actual transitions.
	pub fn check(&self, world: &World, id: EntityId) {
		if !self.registered.get() {
			return;
		}

		let accepted = world.is_active(id) && self.filter.accepts(&world.component_types_of(id));
		let changed = {
			let mut entities = self.entities.borrow_mut();
			match accepted {
				true => entities.insert(id),
				false => entities.remove(&id),
			}
		};

		if changed {
			let entity = world.entity(id);
			match accepted {
				true => {
					log::trace!("adding {} to {}", entity, self);
					self.dispatch(world, Event::Added(entity));
				},
				false => {
					log::trace!("removing {} from {}", entity, self);
					self.dispatch(world, Event::Removed(entity));
				},
			}
		}
	}

	/// Empty the suitable set, notifying the system of every removal.
	pub fn remove_all_entities(&self, world: &World) {
		loop {
			let next = self.entities.borrow_mut().pop_first();
			match next {
				Some(id) => {
					let entity = world.entity(id);
					log::trace!("removing {} from {}", entity, self);
					self.dispatch(world, Event::Removed(entity));
				},
				None => break,
			}
		}
	}

	pub fn notify_modified(&self, world: &World, id: EntityId) {
		if self.registered.get() {
			self.dispatch(world, Event::Modified(world.entity(id)));
		}
	}

	pub fn initialize(&self, world: &World) -> Result<()> {
		self.run(world, "initialize", |system, context| system.initialize(context))
	}

	pub fn update(&self, world: &World, delta_time: f32) -> Result<()> {
		self.run(world, "update", |system, context| system.update(context, delta_time))
	}

	/// Terminate the system. When one of its own hooks is running, termination is
	/// queued behind the pending callbacks and delivered once that hook returns.
	pub fn terminate(&self, world: &World) -> Result<()> {
		if self.behavior.try_borrow_mut().is_err() {
			log::trace!("{} is running, deferring terminate", self);
			self.dispatch(world, Event::Terminated);
			return Ok(());
		}
		self.run(world, "terminate", |system, context| system.terminate(context))
	}

	fn run<F>(&self, world: &World, hook: &str, f: F) -> Result<()>
	where
		F: FnOnce(&mut dyn System, &SystemContext<'_>) -> Result<()>,
	{
		let result = match self.behavior.try_borrow_mut() {
			Ok(mut behavior) => {
				let context = SystemContext::new(world, self);
				f(&mut **behavior, &context)
			},
			Err(_) => {
				log::warn!("{} is already running, skipping reentrant {}", self, hook);
				Ok(())
			},
		};

		self.flush(world);
		result
	}

	fn dispatch(&self, world: &World, event: Event) {
		self.pending.borrow_mut().push_back(event);
		self.flush(world);
	}

	// A hook of this system further up the stack holds the behaviour; whatever is
	// queued now is delivered by that call's own flush once it returns.
	fn flush(&self, world: &World) {
		while let Ok(mut behavior) = self.behavior.try_borrow_mut() {
			let next = self.pending.borrow_mut().pop_front();
			let Some(event) = next else {
				break;
			};

			let context = SystemContext::new(world, self);
			match event {
				Event::Added(entity) => behavior.on_entity_added(&context, &entity),
				Event::Removed(entity) => behavior.on_entity_removed(&context, &entity),
				Event::Modified(entity) => behavior.on_entity_modified(&context, &entity),
				Event::Terminated => {
					if let Err(error) = behavior.terminate(&context) {
						log::warn!("system {} failed to terminate: {}", self, error);
					}
				},
			}
		}
	}
}

impl fmt::Display for SystemSlot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}
