pub use crate::app::App;
pub use rules_objstore_types::error::{ClResult, Error};
pub use rules_objstore_types::types::TenantId;

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
