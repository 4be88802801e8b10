use thiserror::Error;

/// Unified result type for the crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors surfaced by zone composition.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A view was attached without a usable zone name.
    #[error("zone name required")]
    ZoneNameRequired,
    /// A view configuration supplied neither an element nor a tag to
    /// create one from.
    #[error("view has no element")]
    MissingElement,
}
