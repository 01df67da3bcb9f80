pub mod document;
pub mod employer;
pub mod profile;
pub mod user;
