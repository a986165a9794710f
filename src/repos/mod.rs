pub mod error;
pub mod pet_repo;

pub use pet_repo::{InMemoryPetStore, Pet, PetStore, PgPetStore};
