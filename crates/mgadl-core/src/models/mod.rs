pub mod cell;
pub mod patient;
pub mod record;
pub mod responses;
