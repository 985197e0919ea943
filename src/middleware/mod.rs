/// Middleware module
///
/// Custom middleware wrapped around parts of the HTTP surface.

mod hit_counter;

pub use hit_counter::HitCounterMiddleware;
