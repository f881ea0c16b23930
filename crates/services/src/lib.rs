#![forbid(unsafe_code)]

pub mod app_services;
pub mod bookmark_service;
pub mod error;
pub mod media;
pub mod progress_service;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use bookmark_service::BookmarkService;
pub use error::{AppServicesError, GatewayError, MediaError, SessionError};
pub use media::{HttpMediaGateway, MediaConfig, MediaGateway};
pub use progress_service::ProgressService;
pub use sessions::{
    QuizSession, QuizSessionService, SessionParams, SessionSpec, SessionSummaryListItem,
    SessionSummaryService,
};
