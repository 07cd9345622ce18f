use crate::components::{ComponentSet, ComponentTypes};
use crate::data_structures::BitField;
use std::fmt;

/// Decides which entities a [System](crate::systems::System) is interested in,
/// based solely on the set of component types an entity carries.
///
/// Any `Fn(&ComponentTypes) -> bool` closure is a filter.
pub trait TypeFilter: 'static {
	fn accepts(&self, types: &ComponentTypes) -> bool;

	/// A human readable summary, used in logs.
	fn describe(&self) -> String {
		String::from("custom filter")
	}
}

impl<F> TypeFilter for F
where
	F: Fn(&ComponentTypes) -> bool + 'static,
{
	fn accepts(&self, types: &ComponentTypes) -> bool {
		self(types)
	}
}

/// The common filter shape: every `require`d type, none of the `exclude`d ones,
/// and at least one of the `any` types when that set is not empty.
///
/// ```
/// # use sieve_ecs::prelude::*;
/// # #[derive(Component)] struct Position;
/// # #[derive(Component)] struct Velocity;
/// # #[derive(Component)] struct Frozen;
/// let filter = Filter::build()
/// 	.include::<(Position, Velocity)>()
/// 	.exclude::<(Frozen,)>()
/// 	.create();
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Filter {
	require: BitField,
	exclude: BitField,
	any: BitField,
}

impl Filter {
	/// A filter accepting every entity.
	pub fn all() -> Self {
		Self::default()
	}

	pub fn build() -> FilterBuilder {
		FilterBuilder { filter: Self::default() }
	}

	/// Accepts entities having every type in `S`.
	pub fn with<S: ComponentSet>() -> Self {
		Self::build().include::<S>().create()
	}

	pub fn required(&self) -> ComponentTypes {
		self.require.clone().into()
	}

	pub fn excluded(&self) -> ComponentTypes {
		self.exclude.clone().into()
	}

	pub fn any_of(&self) -> ComponentTypes {
		self.any.clone().into()
	}
}

impl TypeFilter for Filter {
	fn accepts(&self, types: &ComponentTypes) -> bool {
		let bits = types.bits();
		self.require.is_subset_of(bits)
			&& !self.exclude.intersects(bits)
			&& (self.any.is_empty() || self.any.intersects(bits))
	}

	fn describe(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for Filter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.require.is_empty() && self.exclude.is_empty() && self.any.is_empty() {
			return f.write_str("any entity");
		}

		let mut parts = Vec::new();
		if !self.require.is_empty() {
			parts.push(format!("require {}", self.required()));
		}
		if !self.exclude.is_empty() {
			parts.push(format!("exclude {}", self.excluded()));
		}
		if !self.any.is_empty() {
			parts.push(format!("any of {}", self.any_of()));
		}
		f.write_str(&parts.join(" "))
	}
}

impl fmt::Debug for Filter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Filter({})", self)
	}
}

pub struct FilterBuilder {
	filter: Filter,
}

impl FilterBuilder {
	pub fn include<S: ComponentSet>(mut self) -> Self {
		self.filter.require.union_with(&S::get_bitfield());
		self
	}

	pub fn exclude<S: ComponentSet>(mut self) -> Self {
		self.filter.exclude.union_with(&S::get_bitfield());
		self
	}

	pub fn any_of<S: ComponentSet>(mut self) -> Self {
		self.filter.any.union_with(&S::get_bitfield());
		self
	}

	pub fn create(self) -> Filter {
		self.filter
	}
}
