use crate::components::{Component, ComponentId, ErasedComponent};
use crate::data_structures::BitField;
use std::hash::BuildHasherDefault;
use nohash_hasher::NoHashHasher;
use std::collections::HashMap;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::any::TypeId;
use std::sync::Arc;

type Hasher = BuildHasherDefault<NoHashHasher<u64>>;

lazy_static! {
	static ref EMPTY_BITFIELD: Arc<BitField> = Arc::new(BitField::new());
	static ref TYPE_TO_BITFIELD: Mutex<HashMap<TypeId, Arc<BitField>, Hasher>> =
		Mutex::new(HashMap::default());
}

/// A tuple of [Component] types, used to name several types at once
/// in [filters](crate::systems::Filter) and bulk component operations.
pub trait ComponentSet: 'static {
	/// The ids of the types in the set, in tuple order.
	fn component_ids() -> Vec<ComponentId>;

	/// The ids of the types in the set as a cached [BitField].
	fn get_bitfield() -> Arc<BitField>;
}

/// A [ComponentSet] whose members can all be default-constructed.
pub trait ComponentBundle: ComponentSet {
	/// Construct one default instance of every type in the set.
	fn create() -> Vec<ErasedComponent>;
}

impl ComponentSet for () {
	fn component_ids() -> Vec<ComponentId> {
		Vec::new()
	}

	fn get_bitfield() -> Arc<BitField> {
		EMPTY_BITFIELD.clone()
	}
}

impl ComponentBundle for () {
	fn create() -> Vec<ErasedComponent> {
		Vec::new()
	}
}

macro_rules! impl_component_set {
    ($($t: ident $i: tt),*) => {
        impl <$($t: Component),*> ComponentSet for ($($t),*,) {
            fn component_ids() -> Vec<ComponentId> {
                vec![$(<$t>::component_id()),*]
            }

            fn get_bitfield() -> Arc<BitField> {
                let key = TypeId::of::<Self>();
                let mut ttb = TYPE_TO_BITFIELD.lock();
                if let Some(bitfield) = ttb.get(&key) {
                    return bitfield.clone()
                }

                let bitfield: Arc<BitField> = Arc::new(
                    Self::component_ids().into_iter().map(|id| id.value()).collect()
                );
                ttb.insert(key, bitfield.clone());
                bitfield
            }
        }

        impl <$($t: Component + Default),*> ComponentBundle for ($($t),*,) {
            fn create() -> Vec<ErasedComponent> {
                vec![$(ErasedComponent::new(<$t>::default())),*]
            }
        }
    };
}

impl_component_set!(T0 0);
impl_component_set!(T0 0, T1 1);
impl_component_set!(T0 0, T1 1, T2 2);
impl_component_set!(T0 0, T1 1, T2 2, T3 3);
impl_component_set!(T0 0, T1 1, T2 2, T3 3, T4 4);
impl_component_set!(T0 0, T1 1, T2 2, T3 3, T4 4, T5 5);
impl_component_set!(T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6);
impl_component_set!(T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6, T7 7);
impl_component_set!(T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6, T7 7, T8 8);
impl_component_set!(T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6, T7 7, T8 8, T9 9);
impl_component_set!(T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6, T7 7, T8 8, T9 9, T10 10);
impl_component_set!(T0 0, T1 1, T2 2, T3 3, T4 4, T5 5, T6 6, T7 7, T8 8, T9 9, T10 10, T11 11);
