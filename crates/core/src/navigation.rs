//! Top-level navigation port

/// Performs full navigations of the running application.
///
/// A navigation is a hard reload: all in-memory state of the current page,
/// the access token included, is gone afterwards. Implementations decide
/// what that means for their host (a browser `location.assign`, a CLI
/// message, a recorded list in tests).
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: &str);
}
