//! # libgenius-service: Lifecycle Engine for LibGenius
//!
//! Runs the pure lending rules of `libgenius-core` against a record store
//! from `libgenius-db`, one writer at a time.
//!
//! ## Module Organization
//!
//! - [`service`] - `LibraryService`, every catalog, lending, transfer and
//!   statistics operation
//! - [`events`] - `ReservationReady` broadcast channel
//! - [`clock`] - Where "today" comes from
//! - [`config`] - `LibraryConfig` (defaults, TOML file, environment)
//! - [`telemetry`] - Tracing subscriber setup
//! - [`suggest`] - Advisory metadata-suggestion seam
//! - [`error`] - `ServiceError` and stable error codes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use libgenius_service::{telemetry, LibraryConfig, LibraryService};
//!
//! let config = LibraryConfig::load(None)?;
//! telemetry::init_tracing(&config.logging.filter);
//!
//! let (service, _db) = LibraryService::open(&config).await?;
//! let mut ready = service.subscribe();
//! service.return_book("2").await?;
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod service;
pub mod suggest;
pub mod telemetry;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::LibraryConfig;
pub use error::{ErrorBody, ErrorCode, ServiceError, ServiceResult};
pub use events::EventBus;
pub use service::LibraryService;
pub use suggest::{suggest_or_none, MetadataSuggester, SuggestError};
