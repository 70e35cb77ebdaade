// ABOUTME: Optional host-opt-in extension primitives, not part of the default primitive set

pub mod dict;
pub mod reference;
