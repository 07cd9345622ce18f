/// The per-entity record kept by the [World](crate::world::World) next to its components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
	pub(crate) active: bool,
	pub(crate) name: String,
	pub(crate) tag: String,
	/// Distinguishes this entity from earlier holders of a reused id.
	pub(crate) generation: u64,
}

impl Attributes {
	/// New entities start out inactive and untagged.
	pub(crate) fn new(name: String, generation: u64) -> Self {
		Self {
			active: false,
			name,
			tag: String::new(),
			generation,
		}
	}

	pub fn is_active(&self) -> bool {
		self.active
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn tag(&self) -> &str {
		&self.tag
	}
}
