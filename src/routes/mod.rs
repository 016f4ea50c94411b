pub mod auth;
pub mod cms;
pub mod landing;
pub mod reviews;
pub mod uploads;
