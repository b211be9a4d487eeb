pub mod event;
pub mod participant;
pub mod setting;
