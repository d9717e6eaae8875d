//! Shared route prefixes.

pub const API_PREFIX: &str = "/api";
pub const USERS_BASE: &str = concat!(API_PREFIX, "/users");
