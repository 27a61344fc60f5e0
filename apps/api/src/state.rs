use std::sync::Arc;

use crate::config::Config;
use crate::oauth::pool::TokenPool;
use crate::oauth::OAuthClient;
use crate::skills_client::SkillExtractor;
use crate::store::MatchStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Uploaded jobs and résumé. Replaced wholesale by the upload endpoints.
    pub store: Arc<MatchStore>,
    pub tokens: Arc<TokenPool>,
    pub auth: OAuthClient,
    /// Pluggable skills backend. Default: SkillsApiClient.
    pub extractor: Arc<dyn SkillExtractor>,
}
