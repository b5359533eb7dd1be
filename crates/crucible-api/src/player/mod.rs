// Player API endpoint modules
//
// Views, applications, teams, users, and templates. Each module adds an
// `impl ApiClient` block with thin, single-purpose endpoint wrappers.

pub mod applications;
pub mod models;
pub mod roles;
pub mod teams;
pub mod templates;
pub mod users;
pub mod views;
