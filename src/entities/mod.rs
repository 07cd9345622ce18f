//! [Entities](Entity) represent the individual "things" in your game or application.
//!
//! An [Entity] doesn't store any data and has no associated behaviour;
//! instead, it identifies which pieces of data ([Components](crate::components::Component)) belong together.
//! All of its state lives in the tables of the [World](crate::world::World) that created it.

mod attributes;
mod entity;
mod entity_builder;

pub use attributes::*;
pub use entity::*;
pub use entity_builder::*;
