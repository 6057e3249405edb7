// Library for tests to access modules

pub mod ammeter_repo;
pub mod config;
pub mod device_repo;
pub mod error;
pub mod models;
pub mod scenarios;
pub mod session;
pub mod summary;
