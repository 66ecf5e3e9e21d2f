pub mod allocation;
pub mod order;
pub mod settings;
pub mod snapshot;
pub mod symbol;
