pub mod env_template;
pub mod kv_text;
