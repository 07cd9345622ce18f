//! [Systems](System) provide the logic for modifying the state of [Entities](crate::entities::Entity)
//! and their associated [Components](crate::components::Component).
//!
//! A [System] must be added to a [World](crate::world::World) for it to become active.
//! From then on the world keeps its set of suitable entities in sync with its [TypeFilter]
//! and calls [System::update] once per frame, highest [Priority] first.

mod filter;
mod system;
mod system_ref;
mod system_slot;
mod system_store;

pub use filter::*;
pub use system::*;
pub use system_ref::*;
pub(crate) use system_slot::*;
pub(crate) use system_store::*;
