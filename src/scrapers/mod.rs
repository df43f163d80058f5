pub mod json_page;

pub use json_page::parse_json_body;
