pub mod tracked;

pub use tracked::{Representation, TrackedImage, WindowKind, fingerprint};
