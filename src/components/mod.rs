//! [Components](Component) hold the data and behaviour of [entities](crate::entities::Entity).
//!
//! Components are stored behind reference-counted cells, so one instance can be
//! shared between several entities.

mod component;
mod component_id;
mod component_set;
mod component_types;
mod observable;

pub use component::*;
pub use component_id::*;
pub use component_set::*;
pub use component_types::*;
pub use observable::*;
pub use sieve_ecs_derive::Component;
