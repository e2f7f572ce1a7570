mod backend;
mod backends;
mod result;

pub use backend::{load_backend, DetectorBackend};
pub use backends::{ScriptedBackend, StubBackend};
pub use result::{BoundingBox, Detection};
