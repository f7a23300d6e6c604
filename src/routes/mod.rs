/// Router Module Index
///
/// Splits the shell's endpoints by whether they need a session. Access control
/// is applied at the router layer, so a handler added to `authenticated` can
/// never be reached anonymously by accident.

/// Navigation, view cache and session endpoints. Open to every caller.
pub mod public;

/// Listener proxies. Require an authenticated console session.
pub mod authenticated;
