//! Database repository layer.
//!
//! Repositories use SeaORM entity models internally and return domain models so the
//! service layer never handles entity types directly.

pub mod guild_config;

#[cfg(test)]
mod test;
