//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing a modification of an entity.
#[derive(Clone, Copy, Debug)]
pub struct Modification;

/// Marker type describing the moment an entity takes effect.
#[derive(Clone, Copy, Debug)]
pub struct Effect;

/// Marker type describing an entity termination.
#[derive(Clone, Copy, Debug)]
pub struct Termination;
