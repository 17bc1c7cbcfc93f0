//! # blog-db
//!
//! Database layer implementing the blog-core repository traits.
//!
//! ## Overview
//!
//! - PostgreSQL repositories via SQLx, with connection pool management and migrations
//! - Database models with SQLx `FromRow` derives and model -> entity mappers
//! - [`MemoryStore`], an in-process implementation of every repository trait
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blog_common::AppConfig;
//! use blog_db::pool::{create_pool, run_migrations, migrations_dir};
//! use blog_db::repositories::PgPostRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let pool = create_pool(&config.database).await?;
//!     run_migrations(&pool, migrations_dir()).await?;
//!     let posts = PgPostRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_from_env, migrations_dir, run_migrations, PgPool};
pub use repositories::{
    PgAnalyticsRepository, PgCommentRepository, PgEngagementRepository, PgPostRepository,
    PgUserRepository,
};
