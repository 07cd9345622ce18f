mod id_pool_tests;
mod world_tests;
mod shared_component_tests;

use crate::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Route `log` output through the test harness.
pub fn init_logging() {
	let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct Position {
	pub x: f32,
	pub y: f32,
}

#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct Velocity {
	pub x: f32,
	pub y: f32,
}

#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct Health(pub i32);

#[derive(Component, Debug, Default)]
pub struct Frozen;

/// What a [Recorder] saw, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seen {
	Initialized,
	Added(EntityId),
	Removed(EntityId),
	Modified(EntityId),
	Updated(EntityId),
	Terminated,
}

pub type Journal = Rc<RefCell<Vec<Seen>>>;

/// A system recording every hook invocation into a shared journal.
pub struct Recorder<const P: u8 = 0> {
	pub journal: Journal,
	pub filter: Filter,
}

impl<const P: u8> Recorder<P> {
	pub fn new(journal: &Journal, filter: Filter) -> Self {
		Self {
			journal: journal.clone(),
			filter,
		}
	}
}

impl<const P: u8> System for Recorder<P> {
	fn priority(&self) -> Priority {
		P
	}

	fn filter(&self) -> Box<dyn TypeFilter> {
		Box::new(self.filter.clone())
	}

	fn initialize(&mut self, _context: &SystemContext<'_>) -> Result<()> {
		self.journal.borrow_mut().push(Seen::Initialized);
		Ok(())
	}

	fn update_entity(&mut self, _context: &SystemContext<'_>, entity: &Entity, _delta_time: f32) -> Result<()> {
		self.journal.borrow_mut().push(Seen::Updated(entity.id()));
		Ok(())
	}

	fn terminate(&mut self, _context: &SystemContext<'_>) -> Result<()> {
		self.journal.borrow_mut().push(Seen::Terminated);
		Ok(())
	}

	fn on_entity_added(&mut self, _context: &SystemContext<'_>, entity: &Entity) {
		self.journal.borrow_mut().push(Seen::Added(entity.id()));
	}

	fn on_entity_removed(&mut self, _context: &SystemContext<'_>, entity: &Entity) {
		self.journal.borrow_mut().push(Seen::Removed(entity.id()));
	}

	fn on_entity_modified(&mut self, _context: &SystemContext<'_>, entity: &Entity) {
		self.journal.borrow_mut().push(Seen::Modified(entity.id()));
	}
}

pub fn journal() -> Journal {
	Rc::new(RefCell::new(Vec::new()))
}

/// Take everything recorded so far.
pub fn drain(journal: &Journal) -> Vec<Seen> {
	std::mem::take(&mut *journal.borrow_mut())
}
