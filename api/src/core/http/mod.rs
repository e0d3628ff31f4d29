pub mod bearer;
pub mod response_envelope;
