//! A small entity-component-system runtime built around a single [World](world::World).
//!
//! [Entities](entities::Entity) are plain handles, [components](components::Component) live in
//! the world's tables and [systems](systems::System) subscribe to entities through a
//! [type filter](systems::TypeFilter). Every structural change is propagated to the systems
//! before the mutating call returns.

extern crate self as sieve_ecs;

pub mod data_structures;
pub mod components;
pub mod entities;
pub mod systems;
pub mod error;
pub mod world;

pub use lazy_static::lazy_static;

pub mod prelude {
	pub use crate::components::*;
	pub use crate::error::{EcsError, Result};
	pub use crate::entities::{Attributes, Entity, EntityBuilder, EntityId, NO_ENTITY};
	pub use crate::systems::{
		Filter, FilterBuilder, Priority, System, SystemContext, SystemHandle, SystemObserver, SystemRef,
		TypeFilter,
	};
	pub use crate::world::{World, WorldConfig};
}

#[cfg(test)]
mod tests;
