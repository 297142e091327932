pub mod admin_seed;
pub mod bots;
