pub mod customers;
pub mod dashboard;
pub mod estimates;
pub mod files;
pub mod generate;
pub mod init;
pub mod items;
pub mod maintenance;
pub mod misc;
pub mod projects;
