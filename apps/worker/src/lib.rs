pub mod config;
pub mod datastore;
pub mod db;
pub mod errors;
pub mod image_client;
pub mod llm_client;
pub mod models;
pub mod pipeline;
pub mod state;
pub mod storage;
