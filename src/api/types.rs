//! API request and response types shared across handlers.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Configured task store backend ("memory" or "sqlite")
    pub store: String,

    /// Whether the server is running in dev mode
    pub dev_mode: bool,

    /// Whether task endpoints require a bearer token
    pub auth_required: bool,
}

/// Registration request (`POST /cadastre`).
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub senha: String,
    pub nome: String,
}

/// Registration response. The password hash is never included.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub email: String,
    pub nome: String,
}

/// Login request (`POST /auth/login`).
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
}

/// Login response containing a JWT for API authentication.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Expiration as unix seconds.
    pub exp: i64,
}
