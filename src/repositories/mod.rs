// Repositories module - data access layer

pub mod menu_repository;


pub use menu_repository::{
    attribute_to_json, item_to_document, DynamoDbMenuRepository, MenuRepository,
};
