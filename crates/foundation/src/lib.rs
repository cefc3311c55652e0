pub mod lnglat;
pub mod zoom;

// Foundation crate: small, well-tested primitives only.
pub use lnglat::*;
pub use zoom::*;
