//! Sensitivity classification boundary.

/// Decides whether answering a message requires the user's profile data.
///
/// The classifier is an external collaborator; the core only consumes its
/// boolean verdict.
pub trait SensitivityClassifier: Send + Sync {
    /// Returns whether the message needs an authorization request.
    fn requires_approval(&self, message: &str) -> bool;
}
