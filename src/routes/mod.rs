// # Routes Module
//
// - HTTP route handlers, grouped by resource.
// - Public routers are merged in `server.rs`; protected ones are wrapped
//   with the auth middleware there.

/// Health check and version endpoints
pub mod health;

/// Registration, login, logout, and current-user endpoints
pub mod auth;

/// User CRUD endpoints
pub mod users;

/// Device CRUD endpoints
pub mod devices;
