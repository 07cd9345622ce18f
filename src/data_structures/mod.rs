mod bit_field;
mod id_pool;

pub use bit_field::*;
pub use id_pool::*;
