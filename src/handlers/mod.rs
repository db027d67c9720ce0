// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (verified bearer token)
pub mod public; // Tier 1: anonymous reads and search
pub mod protected; // Tier 2: identity-gated reads and all writes
