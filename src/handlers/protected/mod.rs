// handlers/protected/mod.rs - Protected handlers (session token required)
//
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware injects AuthUser before any handler here runs

pub mod notes;
