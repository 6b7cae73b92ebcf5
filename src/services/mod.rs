//! Business logic services

pub mod visitors;

use crate::{
    config::VisitorsConfig,
    error::{AppError, AppResult},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub visitors: visitors::VisitorsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, visitors_config: &VisitorsConfig) -> AppResult<Self> {
        let offset = visitors_config
            .log_offset()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Self {
            visitors: visitors::VisitorsService::new(
                repository,
                offset,
                visitors_config.allow_purge,
            ),
        })
    }
}
