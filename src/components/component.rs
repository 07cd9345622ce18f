use crate::components::ComponentId;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A typed fragment of data or behaviour attached to an [entity](crate::entities::Entity).
///
/// An entity holds at most one component per type. Implement it with
/// `#[derive(Component)]`, or by hand with an empty `impl` block.
pub trait Component: 'static {
	/// The process-wide id of this component type.
	fn component_id() -> ComponentId
	where
		Self: Sized,
	{
		ComponentId::register::<Self>()
	}
}

struct ComponentCell<T> {
	links: Cell<usize>,
	value: RefCell<T>,
}

trait ErasedCell {
	fn links(&self) -> &Cell<usize>;
	fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Component> ErasedCell for ComponentCell<T> {
	fn links(&self) -> &Cell<usize> {
		&self.links
	}

	fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
		self
	}
}

/// A shared, mutable reference to a component instance.
///
/// The same instance may be attached to several entities. It is dropped once
/// the last entity and the last [ComponentRef] let go of it.
pub struct ComponentRef<T: Component> {
	cell: Rc<ComponentCell<T>>,
}

impl<T: Component> ComponentRef<T> {
	/// Wrap a new component instance that is not yet attached to any entity.
	pub fn new(value: T) -> Self {
		log::trace!("constructing component {}", ComponentId::of::<T>());
		Self {
			cell: Rc::new(ComponentCell {
				links: Cell::new(0),
				value: RefCell::new(value),
			}),
		}
	}

	/// Immutably borrow the component.
	///
	/// # Panics
	/// Panics if the component is currently mutably borrowed.
	pub fn borrow(&self) -> Ref<'_, T> {
		self.cell.value.borrow()
	}

	/// Mutably borrow the component.
	///
	/// # Panics
	/// Panics if the component is currently borrowed.
	pub fn borrow_mut(&self) -> RefMut<'_, T> {
		self.cell.value.borrow_mut()
	}

	/// The number of entities this instance is attached to.
	pub fn links(&self) -> usize {
		self.cell.links.get()
	}

	/// Check whether two references point to the same instance.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.cell, &other.cell)
	}

	pub(crate) fn erase(&self) -> ErasedComponent {
		ErasedComponent {
			id: ComponentId::of::<T>(),
			cell: self.cell.clone(),
		}
	}
}

impl<T: Component> Clone for ComponentRef<T> {
	fn clone(&self) -> Self {
		Self {
			cell: self.cell.clone(),
		}
	}
}

impl<T: Component + fmt::Debug> fmt::Debug for ComponentRef<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.cell.value.try_borrow() {
			Ok(value) => f.debug_tuple("ComponentRef").field(&*value).finish(),
			Err(_) => f.write_str("ComponentRef(<borrowed>)"),
		}
	}
}

/// A type-erased component instance as stored in an entity's component table.
#[derive(Clone)]
pub struct ErasedComponent {
	id: ComponentId,
	cell: Rc<dyn ErasedCell>,
}

impl ErasedComponent {
	/// Erase a freshly constructed component.
	pub fn new<T: Component>(value: T) -> Self {
		ComponentRef::new(value).erase()
	}

	/// The type of the stored component.
	pub fn component_id(&self) -> ComponentId {
		self.id
	}

	/// Recover the typed reference, if the component is a `T`.
	pub fn downcast<T: Component>(&self) -> Option<ComponentRef<T>> {
		if self.id != ComponentId::of::<T>() {
			return None;
		}
		let cell = self.cell.clone().into_any().downcast::<ComponentCell<T>>().ok()?;
		Some(ComponentRef { cell })
	}

	/// The number of entities this instance is attached to.
	pub fn links(&self) -> usize {
		self.cell.links().get()
	}

	/// Check whether two erased components point to the same instance.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.cell, &other.cell)
	}

	pub(crate) fn link(&self) {
		let links = self.cell.links();
		links.set(links.get() + 1);
	}

	pub(crate) fn unlink(&self) {
		let links = self.cell.links();
		links.set(links.get().saturating_sub(1));
	}
}

impl fmt::Debug for ErasedComponent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ErasedComponent({}, links: {})", self.id, self.links())
	}
}
