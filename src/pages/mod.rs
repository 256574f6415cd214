pub mod grouped;
pub mod home;
pub mod not_found;
