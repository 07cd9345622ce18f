use crate::data_structures::IdPool;
use crate::error::EcsError;
use rand::prelude::SliceRandom;
use rand::thread_rng;

#[test]
pub fn sequential_acquisition() {
	let mut pool = IdPool::new();
	for i in 1..=64 {
		assert_eq!(i, pool.acquire(), "Acquired id does not match expected id");
		assert!(pool.exists(i), "Acquired id does not exist");
	}
	assert_eq!(64, pool.count(), "Count does not match the number of acquired ids");
	assert!(!pool.exists(0), "The null id can never exist");
}

#[test]
pub fn released_ids_are_reused_first() {
	let mut pool = IdPool::with_capacity(8);
	let a = pool.acquire();
	let b = pool.acquire();

	pool.release(a).unwrap();
	assert!(!pool.exists(a), "Released id still exists");
	assert_eq!(a, pool.acquire(), "Released id was not reused");
	assert_eq!(b + 1, pool.acquire(), "Fresh id was not issued after the reusable ones ran out");
}

#[test]
pub fn shuffled_release() {
	let count = 1024;
	let mut pool = IdPool::with_capacity(16);
	let mut ids: Vec<_> = (0..count).map(|_| pool.acquire()).collect();
	ids.shuffle(&mut thread_rng());

	for (i, id) in ids.iter().enumerate() {
		pool.release(*id).unwrap();
		assert_eq!(count - i - 1, pool.count(), "Count does not match after release");
	}

	// Every id is reused before a fresh one is issued.
	let mut reused: Vec<_> = (0..count).map(|_| pool.acquire()).collect();
	reused.sort_unstable();
	assert_eq!((1..=count as u32).collect::<Vec<_>>(), reused, "Reused ids do not match");
	assert_eq!(count as u32 + 1, pool.acquire(), "Pool grew before reusing every id");
}

#[test]
pub fn releasing_a_free_id_fails() {
	let mut pool = IdPool::new();
	let id = pool.acquire();
	pool.release(id).unwrap();

	assert!(
		matches!(pool.release(id), Err(EcsError::DeadEntity { .. })),
		"Double release was accepted"
	);
	assert!(pool.release(0).is_err(), "Releasing the null id was accepted");
	assert!(pool.release(500).is_err(), "Releasing a never issued id was accepted");
	assert_eq!(0, pool.count(), "Failed releases changed the count");
}

#[test]
pub fn clear_restores_initial_state() {
	let mut pool = IdPool::with_capacity(100);
	pool.require(5000);
	for _ in 0..300 {
		pool.acquire();
	}

	pool.clear();
	assert_eq!(0, pool.count(), "Cleared pool still has ids");
	assert!(!pool.exists(1), "Cleared pool still knows old ids");
	assert!(pool.capacity() >= 100, "Cleared pool lost its initial capacity");
	assert!(pool.capacity() < 5000, "Cleared pool kept its grown capacity");
	assert_eq!(1, pool.acquire(), "Cleared pool did not restart at the first id");
}
