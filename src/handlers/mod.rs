// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (JWT auth + restaurant scope)
pub mod protected; // /api/* and /api/restaurants/:restaurant_id/*
pub mod public;    // / and /health
