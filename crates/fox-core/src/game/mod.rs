pub mod record;
pub mod rules;
pub mod serialization;
pub mod state;
