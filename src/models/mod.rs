pub mod place;
pub mod trip;
