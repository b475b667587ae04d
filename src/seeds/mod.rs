pub mod demo_seed;

pub use demo_seed::{seed_admin, seed_demo_data, SeedSummary};
