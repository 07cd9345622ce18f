//! Precondition violations reported by the [World](crate::world::World) and its handles.

use crate::components::ComponentId;
use crate::entities::EntityId;

/// A violated precondition.
///
/// Every variant is detected before the offending call touches any table,
/// so a returned error never leaves a half-applied mutation behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
	#[error("there is no existing entity with id #{id}, can't {operation}")]
	DeadEntity { id: EntityId, operation: &'static str },

	#[error("entity #{id} already contains a component of type {component}, can't add another")]
	DuplicateComponent { id: EntityId, component: ComponentId },

	#[error("entity #{id} doesn't have a component of type {component}, can't {operation}")]
	MissingComponent {
		id: EntityId,
		component: ComponentId,
		operation: &'static str,
	},

	#[error("a system of type {system} already exists in world \"{world}\", can't add another")]
	DuplicateSystem { system: &'static str, world: String },

	#[error("a system of type {system} doesn't exist in world \"{world}\", can't {operation}")]
	MissingSystem {
		system: &'static str,
		world: String,
		operation: &'static str,
	},

	#[error("entity #{owner} doesn't have a component of type {component} to share with entity #{target}")]
	ShareSourceMissingComponent {
		owner: EntityId,
		target: EntityId,
		component: ComponentId,
	},
}

pub type Result<T, E = EcsError> = std::result::Result<T, E>;

/// Reports a violated precondition.
pub(crate) fn violation<T>(error: EcsError) -> Result<T> {
	log::warn!("{}", error);
	Err(error)
}

/// Returns early with the given error when a precondition does not hold.
macro_rules! ensure {
	($condition: expr, $error: expr) => {
		if !$condition {
			return $crate::error::violation($error);
		}
	};
}

pub(crate) use ensure;
