pub mod auth;
pub mod resource;
pub mod suspect;
pub mod system;
