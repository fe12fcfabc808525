pub mod accounting;
pub mod catalog_import;
pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod recommend;
pub mod service;
