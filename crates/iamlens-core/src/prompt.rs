//! Interactive selection seam

use crate::error::Result;

/// Asks the operator to pick one option from a list.
///
/// Returns the index of the chosen option, or `None` when the operator
/// cancelled. Implementations that cannot prompt at all (no terminal) return
/// [`crate::LensError::DependencyMissing`].
pub trait Chooser {
    fn choose(&mut self, prompt: &str, options: &[String]) -> Result<Option<usize>>;

    /// Whether prompting is possible at all, checked before any network work
    fn is_available(&self) -> bool {
        true
    }
}
