pub mod driver;
pub mod ride;
pub mod rider;
pub mod vehicle;
