pub mod persistence;

pub use persistence::{AddressedState, AddressedStateStore};
