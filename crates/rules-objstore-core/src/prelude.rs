pub use rules_objstore_types::error::{ClResult, Error};
pub use rules_objstore_types::types::TenantId;

pub use tracing::{debug, error, info, warn};

// vim: ts=4
