pub mod repository;

pub use repository::PluginKvRepository;
