pub mod auth;
pub mod dashboard;
pub mod events;
pub mod in_flight;
pub mod landing;
pub mod locale;
pub mod middleware;
pub mod pages;
pub mod relay;
pub mod router;
pub mod session;
pub mod state;

// Re-export the router builder to make it easily accessible to the binary
// and the integration tests.
pub use router::build_router;
