pub mod app;
pub mod config;
pub mod error;
pub mod models {
    pub mod contact_validator;
}
pub mod db {
    pub mod contact_repository;
    pub mod models;
    pub mod repository;
}
pub mod api {
    pub mod admin;
    pub mod contact;
    pub mod errors;
    pub mod extract;
    pub mod health;
    pub mod paging;
}
