//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// All ledger records are entities: they are owned by the persistence store
/// and identified by a typed rowid wrapper.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
