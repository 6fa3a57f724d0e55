pub mod repository;

pub use repository::PhotoReadRepository;
