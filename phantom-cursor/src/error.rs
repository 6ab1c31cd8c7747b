use crate::page::PageError;

/// Errors surfaced to callers of the cursor API.
#[derive(thiserror::Error, Debug)]
pub enum CursorError {
    #[error("could not find element with selector `{selector}`")]
    ElementNotFound { selector: String },

    /// The element kept moving away from the planned destination.
    #[error("could not mouse over element within {tries} tries")]
    MaxTries { tries: u32 },

    #[error("no geometry strategy produced a bounding box")]
    GeometryUnavailable,

    #[error(transparent)]
    Page(#[from] PageError),
}

pub type Result<T, E = CursorError> = std::result::Result<T, E>;
