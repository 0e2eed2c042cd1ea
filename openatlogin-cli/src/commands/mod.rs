pub mod show;
pub mod toggle;
