pub mod memory;
pub mod oracle;
pub mod recorder;
pub mod store;
pub mod valkey;

pub use memory::InMemoryRevocationStore;
pub use oracle::{RevocationOracle, RevocationPolicy};
pub use recorder::ForcedSignOutRecorder;
pub use store::{RevocationError, RevocationRecord, RevocationStore};
pub use valkey::ValkeyRevocationStore;
