//! File-system adapters for ksync.
//!
//! Sessions and articles live in JSON collection files in the data
//! directory; configuration and secrets live in the config directory.

pub mod config_service;
pub mod json_article_repository;
pub mod json_session_repository;
pub mod paths;
pub mod secret_service;
pub mod seed;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::json_article_repository::JsonArticleRepository;
pub use crate::json_session_repository::JsonSessionRepository;
pub use crate::paths::KsyncPaths;
pub use crate::secret_service::SecretServiceImpl;
