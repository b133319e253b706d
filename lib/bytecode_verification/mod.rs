pub mod compare_bytecodes;
pub mod immutables;
pub mod mask;
pub mod metadata;
pub mod normalize;
pub mod pool_hash;
pub mod verify_bytecode;

pub use compare_bytecodes::{compare, CompareBytecode, DifferenceRecord};
pub use immutables::ImmutableRegistry;
pub use mask::{mask_values, MASK_CHAR};
pub use metadata::strip_metadata;
pub use normalize::normalize_addresses;
pub use pool_hash::{locate_pool_init_code_hash, HashLocation};
pub use verify_bytecode::compare_contract;
