pub mod doctor;
pub mod provision;
