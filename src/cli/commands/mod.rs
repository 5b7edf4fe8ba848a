pub mod db;
pub mod key;
pub mod profile;
pub mod token;
