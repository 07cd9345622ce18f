use crate::tests::{Health, Position, Velocity};
use crate::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Component)]
struct Texture {
	drops: Rc<Cell<usize>>,
}

impl Drop for Texture {
	fn drop(&mut self) {
		self.drops.set(self.drops.get() + 1);
	}
}

#[test]
pub fn shared_component_lifecycle() {
	let world = World::default();
	let drops = Rc::new(Cell::new(0));
	let a = world.create_entity("a");
	let b = world.create_entity("b");

	a.add(Texture { drops: drops.clone() }).unwrap();
	assert!(!a.shares::<Texture>().unwrap(), "A component held by one entity is not shared");

	let shared = b.add_shared::<Texture>(&a).unwrap();
	assert!(a.shares::<Texture>().unwrap(), "Source does not report sharing");
	assert!(b.shares::<Texture>().unwrap(), "Target does not report sharing");
	assert_eq!(2, shared.links(), "Shared component is not linked twice");
	drop(shared);

	a.destroy().unwrap();
	assert_eq!(0, drops.get(), "Shared component was dropped while still in use");
	assert!(b.has::<Texture>().unwrap().is_some(), "Destroying the source removed the shared component");
	assert!(!b.shares::<Texture>().unwrap(), "Remaining holder still reports sharing");

	b.destroy().unwrap();
	assert_eq!(1, drops.get(), "Shared component was not dropped with its last holder");
}

#[test]
pub fn shared_state_is_visible_to_every_holder() {
	let world = World::default();
	let a = world.create_entity("a");
	let b = world.create_entity("b");

	a.add(Position { x: 1.0, y: 1.0 }).unwrap();
	b.add_shared::<Position>(&a).unwrap();
	a.get::<Position>().unwrap().borrow_mut().x = 9.0;

	assert_eq!(9.0, b.get::<Position>().unwrap().borrow().x, "Holders see different instances");
	assert!(
		a.get::<Position>().unwrap().ptr_eq(&b.get::<Position>().unwrap()),
		"Holders do not point to the same instance"
	);

	b.remove::<Position>().unwrap();
	assert_eq!(9.0, a.get::<Position>().unwrap().borrow().x, "Unlinking one holder changed the other");
	assert!(!a.shares::<Position>().unwrap(), "Unlinked holder is still counted");
}

#[test]
pub fn sharing_preconditions() {
	let world = World::default();
	let source = world.create_entity("source");
	let target = world.create_entity("target");
	source.add(Health(5)).unwrap();
	target.add(Health(1)).unwrap();

	assert!(
		matches!(target.add_shared::<Velocity>(&source), Err(EcsError::ShareSourceMissingComponent { .. })),
		"Sharing a missing component was accepted"
	);
	assert!(
		matches!(target.add_shared::<Health>(&source), Err(EcsError::DuplicateComponent { .. })),
		"Sharing onto an existing component was accepted"
	);

	let dead = world.create_entity("dead");
	dead.destroy().unwrap();
	assert!(
		matches!(target.add_shared::<Health>(&dead), Err(EcsError::DeadEntity { .. })),
		"Sharing from a dead entity was accepted"
	);
}

#[test]
pub fn shared_component_sets_and_refs() {
	let world = World::default();
	let source = world.create_entity_with::<(Position, Velocity)>("source").unwrap();
	let target = world.create_entity("target");

	target.add_shared_components::<(Position, Velocity)>(&source).unwrap();
	assert!(target.shares::<Position>().unwrap(), "Set sharing missed a type");
	assert!(target.shares::<Velocity>().unwrap(), "Set sharing missed a type");

	let health = ComponentRef::new(Health(3));
	let third = world.create_entity("third");
	source.add_ref(&health).unwrap();
	third.add_ref(&health).unwrap();
	assert_eq!(2, health.links(), "Attached reference is not linked to both entities");
	assert!(third.shares::<Health>().unwrap(), "Attached reference is not shared");
}
