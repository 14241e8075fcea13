pub mod health;
pub mod site_key;
pub mod upload;
