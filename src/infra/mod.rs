pub mod db;
pub mod documents;
pub mod store;
