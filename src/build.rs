mod builder;
mod document;
mod feed;
pub mod index;
pub mod markdown;
mod nav;
mod pages;
mod pagination;
mod paths;
mod render;
mod slug;
mod store;

pub use builder::Builder;
pub use paths::{base_path_from_config, normalize, resolve, staging_dir};
