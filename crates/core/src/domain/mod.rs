pub mod payment;
pub mod status;
