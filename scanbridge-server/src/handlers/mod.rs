pub mod devices;
pub mod events;
pub mod health;
pub mod scans;
