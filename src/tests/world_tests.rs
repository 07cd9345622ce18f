use crate::tests::{drain, init_logging, journal, Health, Position, Recorder, Seen, Velocity};
use crate::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
pub fn find_and_destroy_by_name() {
	init_logging();
	let world = World::new("W");
	let e1 = world.create_entity("alpha");
	world.create_entity("beta");

	assert_eq!(e1, world.find_entity("alpha"), "Lookup by name failed");

	e1.destroy().unwrap();
	assert!(world.find_entity("alpha").is_null(), "Destroyed entity can still be found");
	assert!(!world.is_existing(e1.id()), "Destroyed entity still exists");
	assert_eq!(1, world.number_of_entities(), "Wrong number of entities left");
}

#[test]
pub fn lookups_scan_in_id_order() {
	let world = World::default();
	let knights = world.create_entities(3, "knight");
	let archer = world.create_entity("archer_knight");
	knights[0].set_tag("red").unwrap();
	knights[2].set_tag("red_team").unwrap();
	archer.set_tag("blue_team").unwrap();

	assert_eq!(
		vec!["knight0", "knight1", "knight2"],
		knights.iter().map(|k| k.name().unwrap()).collect::<Vec<_>>(),
		"Bulk names are not indexed"
	);
	assert_eq!(knights, world.find_entities_starting_with("knight"), "Prefix lookup does not match");
	assert_eq!(vec![archer.clone()], world.find_entities_ending_with("_knight"), "Suffix lookup does not match");
	assert_eq!(vec![knights[1].clone()], world.find_entities("knight1"), "Name lookup does not match");
	assert!(world.find_entities("nobody").is_empty(), "Lookup of a missing name found something");

	assert_eq!(knights[0], world.find_entity_tagged("red"), "Tag lookup does not match");
	assert_eq!(vec![knights[0].clone()], world.find_entities_tagged("red"), "Tag lookup does not match");
	assert_eq!(
		vec![knights[0].clone(), knights[2].clone()],
		world.find_entities_tagged_starting_with("red"),
		"Tag prefix lookup does not match"
	);
	assert_eq!(
		vec![knights[2].clone(), archer.clone()],
		world.find_entities_tagged_ending_with("_team"),
		"Tag suffix lookup does not match"
	);
	assert!(world.find_entity_tagged("green").is_null(), "Missing tag was found");

	knights[1].deactivate().unwrap();
	assert_eq!(
		knights[1],
		world.find_entity_by(|attributes| !attributes.is_active()),
		"Predicate lookup does not match"
	);
}

#[test]
pub fn destruction_cascade() {
	let world = World::default();
	let log = journal();
	world.add(Recorder::<0>::new(&log, Filter::with::<(Position,)>())).unwrap();
	world.add(Recorder::<1>::new(&log, Filter::with::<(Velocity,)>())).unwrap();

	let entity = world.create_entity_with::<(Position, Velocity, Health)>("victim").unwrap();
	let health = entity.get::<Health>().unwrap();
	drain(&log);

	world.destroy_entity(entity.id()).unwrap();
	let seen = drain(&log);
	assert_eq!(2, seen.len(), "Every subscribed system should see exactly one removal");
	assert!(seen.iter().all(|s| *s == Seen::Removed(entity.id())), "Unexpected callbacks: {:?}", seen);
	assert_eq!(0, health.links(), "Component is still linked to the destroyed entity");
	assert!(!world.is_existing(entity.id()), "Destroyed entity still exists");

	let reused = world.create_entity("newcomer");
	assert_eq!(entity.id(), reused.id(), "Destroyed id was not reused");
	assert_eq!(0, reused.number_of_components().unwrap(), "Reused id inherited components");
	assert!(
		matches!(world.destroy_entity(999), Err(EcsError::DeadEntity { id: 999, .. })),
		"Destroying a missing entity was accepted"
	);
}

#[test]
pub fn cascading_destruction_is_tolerated() {
	struct Linked;

	impl System for Linked {
		fn on_entity_removed(&mut self, context: &SystemContext<'_>, entity: &Entity) {
			// Destroying an even entity takes the next one with it.
			let next = context.world().entity(entity.id() + 1);
			if entity.id() % 2 == 0 && next.is_existing() {
				next.destroy().unwrap();
			}
		}
	}

	let world = World::default();
	world.add(Linked).unwrap();
	let entities = world.create_entities(6, "");

	// 1, 2 (taking 3), 4 (taking 5) and 6.
	let destroyed = world.destroy_entities(&entities).unwrap();
	assert_eq!(4, destroyed, "Cascaded destructions were counted or attempted twice");
	assert_eq!(0, world.number_of_entities(), "Entities survived bulk destruction");
}

#[test]
pub fn activation_is_idempotent() {
	let world = World::default();
	let log = journal();
	world.add(Recorder::<0>::new(&log, Filter::all())).unwrap();
	let entity = world.create_entity("toggle");
	drain(&log);

	world.activate_entity(entity.id()).unwrap();
	assert!(drain(&log).is_empty(), "Activating an active entity produced a callback");

	world.deactivate_entity(entity.id()).unwrap();
	world.deactivate_entity(entity.id()).unwrap();
	assert_eq!(vec![Seen::Removed(entity.id())], drain(&log), "Deactivation callbacks do not match");
	assert!(world.is_existing(entity.id()) && !world.is_active(entity.id()), "Activity flags do not match");
	assert!(world.activate_entity(1234).is_err(), "Activating a missing entity was accepted");
}

#[test]
pub fn clear_removes_systems_before_entities() {
	struct Teardown<const P: u8> {
		order: Rc<RefCell<Vec<Priority>>>,
	}

	impl<const P: u8> System for Teardown<P> {
		fn priority(&self) -> Priority {
			P
		}

		fn terminate(&mut self, _context: &SystemContext<'_>) -> Result<()> {
			self.order.borrow_mut().push(P);
			Ok(())
		}
	}

	let world = World::new("cleared");
	let log = journal();
	let order = Rc::new(RefCell::new(Vec::new()));
	world.add(Teardown::<9> { order: order.clone() }).unwrap();
	world.add(Recorder::<0>::new(&log, Filter::all())).unwrap();
	world.add(Teardown::<2> { order: order.clone() }).unwrap();
	world.create_entities(2, "e");
	drain(&log);

	world.clear();
	assert_eq!(
		vec![Seen::Removed(1), Seen::Removed(2), Seen::Terminated],
		drain(&log),
		"Clearing did not tear systems down first"
	);
	assert_eq!(vec![2, 9], *order.borrow(), "Systems were not torn down lowest priority first");
	assert_eq!(0, world.number_of_entities(), "Entities survived clearing");
	assert_eq!(0, world.number_of_systems(), "Systems survived clearing");
	assert_eq!(1, world.create_entity("fresh").id(), "Ids were not reset");
}

#[test]
pub fn dropping_the_last_handle_clears() {
	let log = journal();
	let entity = {
		let world = World::with_config(WorldConfig::new("short lived").with_initial_capacity(4));
		world.add(Recorder::<0>::new(&log, Filter::all())).unwrap();
		let copy = world.clone();
		drop(copy);
		assert!(!log.borrow().contains(&Seen::Terminated), "Dropping a clone tore the world down");
		world.create_entity("last")
	};

	assert_eq!(Seen::Terminated, *log.borrow().last().unwrap(), "Dropping the world did not terminate its systems");
	assert!(entity.world().is_none(), "World outlived its last handle");
}

#[test]
pub fn configuration_defaults() {
	let config = WorldConfig::default();
	assert_eq!("World", config.name, "Default name does not match");
	assert_eq!(1000, config.initial_capacity, "Default capacity does not match");

	let world = World::default();
	assert_eq!("World", world.name(), "World did not take the default name");
	assert_eq!("\"World\"", world.to_string(), "Display does not match");
	assert!(world.ptr_eq(&world.clone()), "Clones refer to different worlds");
	assert!(!world.ptr_eq(&World::default()), "Distinct worlds compare as the same");
}

#[test]
pub fn destroy_leaves_a_respawned_entity_alone() {
	struct Respawner;

	impl System for Respawner {
		fn filter(&self) -> Box<dyn TypeFilter> {
			Box::new(Filter::with::<(Health,)>())
		}

		fn on_entity_removed(&mut self, context: &SystemContext<'_>, entity: &Entity) {
			if entity.name().map_or(false, |name| name == "victim") {
				entity.destroy().unwrap();
				context.world().create_entity_with::<(Health,)>("respawned").unwrap();
			}
		}
	}

	init_logging();
	let world = World::new("respawn");
	let respawner = world.add(Respawner).unwrap();
	let victim = world.create_entity_with::<(Health,)>("victim").unwrap();

	victim.destroy().unwrap();
	let respawned = world.find_entity("respawned");
	assert!(respawned.is_existing(), "Outer destroy removed the entity that reused the id");
	assert_eq!(victim.id(), respawned.id(), "Respawned entity did not reuse the freed id");
	assert!(respawned.has::<Health>().unwrap().is_some(), "Respawned entity lost its components");
	assert!(respawned.is_active(), "Respawned entity was deactivated");
	assert_eq!(1, world.number_of_entities(), "Wrong number of entities left");
	assert_eq!(vec![respawned], respawner.entities(), "Respawned entity is missing from the system");
}

#[test]
pub fn failed_build_leaves_a_replacement_alone() {
	init_logging();
	let world = World::new("replace");
	let result = world.build_entity("original", |e| {
		e.entity().destroy()?;
		world.create_entity_with::<(Health,)>("replacement")?;
		Err(EcsError::DeadEntity { id: e.entity().id(), operation: "initialize it" })
	});

	assert!(matches!(result, Err(EcsError::DeadEntity { .. })), "Initializer error was swallowed");
	let replacement = world.find_entity("replacement");
	assert!(replacement.is_existing(), "Discarding the failed build destroyed the replacement");
	assert!(replacement.has::<Health>().unwrap().is_some(), "Replacement lost its components");
	assert_eq!(1, world.number_of_entities(), "Wrong number of entities left");
}
