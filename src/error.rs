//! Top-level engine error types.

use derive_more::{Display, Error};

/// Errors the engine itself can produce.
///
/// Malformed sub-trees never reach this type — the comparator degrades
/// gracefully by emitting fewer findings. `EngineError` only covers the
/// two ways a whole document can fail to become a [`SpecDoc`](crate::SpecDoc)
/// or fail the façade's precondition check.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum EngineError {
    /// The loader produced `null` (empty input) or a non-map top-level value,
    /// or a caller passed such a value directly to [`diff`](crate::diff).
    #[display(fmt = "input is not a usable OpenAPI document")]
    InputInvalid,

    /// The input looked like YAML but no YAML decoder was available.
    #[display(fmt = "YAML input requires a YAML decoder, none is available")]
    YamlUnavailable,
}
