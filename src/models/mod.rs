pub mod appointments;
pub mod availability;
pub mod counselor_profiles;
pub mod profiles;
pub mod sessions;
