pub mod context;
pub mod error;
pub mod factory;
pub mod gate;
pub mod groups;
pub mod revocation;
pub mod token;

pub use context::{AuthCtx, RequestContext};
pub use error::AuthError;
pub use gate::AccessGate;
pub use groups::GroupSet;
