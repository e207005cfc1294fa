pub mod bulk_service;
pub mod view_service;
