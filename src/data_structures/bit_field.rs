use std::hash::{Hash, Hasher};
use std::cmp::Ordering;
use std::iter::repeat;

const BITS: usize = 32;
const FIRST_BIT: u32 = 1 << (BITS - 1);

/// A dynamically sized bit-field.
#[derive(Default, Clone, Debug)]
pub struct BitField {
	values: Vec<u32>,
}

impl BitField {
	/// Create a new [BitField].
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a new [BitField] with the specified capacity.
	///
	/// # Arguments
	/// * `capacity` - A usize representing the container's target capacity in bits
	pub fn with_capacity(capacity: usize) -> Self {
		let mut instance = Self { values: Vec::new() };
		instance.ensure_capacity(capacity);
		instance
	}

	/// Get the value of the bit at index `i`.
	/// Bits beyond the current capacity read as unset.
	///
	/// # Arguments
	/// * `i` - The index of the element to retrieve
	#[inline(always)]
	pub fn get(&self, i: usize) -> bool {
		let (position, shift) = Self::pos_shift(i);
		match self.values.get(position) {
			Some(value) => (value & (FIRST_BIT >> shift)) != 0,
			None => false,
		}
	}

	/// Set the value of the bit at index `i`, growing the field when needed.
	///
	/// # Arguments
	/// * `i` - The index of the element to modify
	#[inline(always)]
	pub fn set(&mut self, i: usize, value: bool) {
		let (position, shift) = Self::pos_shift(i);
		let bit = FIRST_BIT >> shift;

		match value {
			true => {
				if self.values.len() <= position {
					self.extend_to_position(position);
				}
				self.values[position] |= bit;
			},

			false => {
				if let Some(word) = self.values.get_mut(position) {
					*word &= !bit;
				}
			},
		}
	}

	/// Check if every set bit of this [BitField] is also set in `other`.
	/// An empty [BitField] is a subset of everything.
	///
	/// # Arguments
	/// * `other` - The bitfield to check against
	pub fn is_subset_of(&self, other: &BitField) -> bool {
		self.values.iter().enumerate().all(|(i, mask)| {
			let bits = other.values.get(i).copied().unwrap_or(0);
			(bits & *mask) == *mask
		})
	}

	/// Check if this [BitField] shares at least one set bit with `other`.
	pub fn intersects(&self, other: &BitField) -> bool {
		self.values.iter().zip(other.values.iter()).any(|(a, b)| (a & b) != 0)
	}

	/// Set every bit that is set in `other`.
	pub fn union_with(&mut self, other: &BitField) {
		if self.values.len() < other.values.len() {
			self.values.resize(other.values.len(), 0);
		}
		for (word, bits) in self.values.iter_mut().zip(other.values.iter()) {
			*word |= *bits;
		}
	}

	/// Check whether no bit is set.
	pub fn is_empty(&self) -> bool {
		self.values.iter().all(|word| *word == 0)
	}

	/// Count the set bits.
	pub fn count_ones(&self) -> usize {
		self.values.iter().map(|word| word.count_ones() as usize).sum()
	}

	/// Set all bits to 0.
	pub fn clear(&mut self) {
		self.values.fill(0);
	}

	/// Set the minimum capacity of the [BitField].
	/// # Arguments
	/// * `capacity` - A usize representing the container's minimum capacity in bits
	pub fn ensure_capacity(&mut self, capacity: usize) {
		if self.values.len() * BITS < capacity {
			let mut count = capacity / BITS;
			if count * BITS < capacity {
				count += 1;
			}
			count -= self.values.len();

			self.values.extend(repeat(0).take(count));
		}
	}

	/// Get the [BitField]'s capacity in bits.
	pub fn capacity(&self) -> usize {
		self.values.len() * BITS
	}

	/// Iterate over the indices of the set bits in ascending order.
	pub fn ones(&self) -> Ones<'_> {
		Ones {
			index: 0,
			current: self.values.first().copied().unwrap_or(0),
			values: &self.values,
		}
	}

	#[inline(never)]
	fn extend_to_position(&mut self, position: usize) {
		let count = position - self.values.len() + 1;
		self.values.extend(repeat(0).take(count));
	}

	#[inline(always)]
	fn pos_shift(a: usize) -> (usize, usize) {
		(a / BITS, a % BITS)
	}
}

impl Eq for BitField {}

impl PartialEq<Self> for BitField {
	fn eq(&self, other: &Self) -> bool {
		match self.values.len().cmp(&other.values.len()) {
			Ordering::Equal => self.values.eq(&other.values),
			Ordering::Less => {
				self.values.eq(&other.values[0..self.values.len()])
					&& other.values[self.values.len()..].iter().all(|i| *i == 0)
			},
			Ordering::Greater => {
				self.values[0..other.values.len()].eq(&other.values)
					&& self.values[other.values.len()..].iter().all(|i| *i == 0)
			},
		}
	}
}

impl Hash for BitField {
	fn hash<H: Hasher>(&self, state: &mut H) {
		let last = self.values.iter().rposition(|value| *value != 0);
		if let Some(last) = last {
			for i in &self.values[0..=last] {
				i.hash(state);
			}
		}
	}
}

impl FromIterator<usize> for BitField {
	fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
		let mut bitfield = BitField::new();
		for i in iter {
			bitfield.set(i, true);
		}
		bitfield
	}
}

/// Iterates over the indices of the set bits of a [BitField].
pub struct Ones<'l> {
	index: usize,
	current: u32,
	values: &'l [u32],
}

impl Iterator for Ones<'_> {
	type Item = usize;

	fn next(&mut self) -> Option<Self::Item> {
		while self.current == 0 {
			self.index += 1;
			self.current = *self.values.get(self.index)?;
		}

		let shift = self.current.leading_zeros() as usize;
		self.current &= !(FIRST_BIT >> shift);
		Some(self.index * BITS + shift)
	}
}
