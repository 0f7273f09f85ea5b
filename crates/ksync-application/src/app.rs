//! Application wiring: paths, configuration, secrets and repositories.

use crate::export::ArticleExporter;
use crate::interview::InterviewOrchestrator;
use crate::knowledge_base::KnowledgeBase;
use ksync_core::Result;
use ksync_core::article::ArticleRepository;
use ksync_core::config::KsyncConfig;
use ksync_core::secret::SecretService;
use ksync_core::session::SessionRepository;
use ksync_infrastructure::seed::sample_articles;
use ksync_infrastructure::{
    ConfigService, JsonArticleRepository, JsonSessionRepository, KsyncPaths, SecretServiceImpl,
};
use ksync_interaction::{AiGateway, AiStatus};
use std::path::PathBuf;
use std::sync::Arc;

/// Startup options, usually taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub config_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    /// Skip credentials entirely and run on fallback content.
    pub offline: bool,
}

impl AppOptions {
    /// Directories from the overrides, `KSYNC_HOME` or the platform defaults.
    ///
    /// `[storage] data_dir` from `config.toml` is applied later by
    /// [`KsyncApp::bootstrap`].
    pub fn resolve_paths(&self) -> Result<KsyncPaths> {
        KsyncPaths::resolve(self.config_dir.as_deref(), self.data_dir.as_deref())
    }
}

/// Long-lived services shared by every interview.
pub struct KsyncApp {
    paths: KsyncPaths,
    config: KsyncConfig,
    gateway: AiGateway,
    sessions: Arc<dyn SessionRepository>,
    articles: Arc<dyn ArticleRepository>,
}

impl KsyncApp {
    /// Resolves directories, loads `config.toml` and `secret.json`, and opens storage.
    ///
    /// Missing config and secret files are created with defaults.
    pub async fn bootstrap(options: &AppOptions) -> Result<Self> {
        let paths = options.resolve_paths()?;
        let config_service = ConfigService::new(paths.config_file());
        config_service.ensure_config_file()?;
        let config = config_service.get_config()?;

        let paths = paths.with_storage_config(&config.storage, options.data_dir.is_some());
        paths.ensure_dirs()?;
        paths.ensure_secret_file()?;

        if options.offline {
            tracing::info!("Offline mode, AI features use fallback content");
            Self::assemble(paths, config, None).await
        } else {
            let secrets = SecretServiceImpl::new(paths.secret_file());
            Self::assemble(paths, config, Some(&secrets)).await
        }
    }

    /// Builds the app from resolved paths and configuration.
    ///
    /// Without a secret service (or without a usable key) the gateway runs
    /// unconfigured.
    pub async fn assemble(
        paths: KsyncPaths,
        config: KsyncConfig,
        secrets: Option<&dyn SecretService>,
    ) -> Result<Self> {
        let mut ai = config.ai.clone();
        let api_key = match secrets {
            Some(service) => match service.load_secrets().await {
                Ok(secret) => {
                    if let Some(model) = secret.gemini.as_ref().and_then(|g| g.model_name.clone()) {
                        ai.model = model;
                    }
                    secret.gemini_api_key().map(str::to_string)
                }
                Err(message) => {
                    tracing::warn!("{}; continuing without AI", message);
                    None
                }
            },
            None => None,
        };
        let gateway = AiGateway::from_config(api_key.as_deref(), &ai);

        let quota = config.storage.quota_bytes;
        let articles = JsonArticleRepository::new(paths.data_dir(), quota);
        if config.storage.seed_sample_articles {
            articles.seed_if_missing(sample_articles()).await?;
        }
        let sessions = JsonSessionRepository::new(paths.data_dir(), quota);

        let app = Self {
            paths,
            config,
            gateway,
            sessions: Arc::new(sessions),
            articles: Arc::new(articles),
        };
        let status = app.ai_status();
        tracing::info!(
            data_dir = %app.paths.data_dir().display(),
            ai_available = status.available,
            model = %ai.model,
            "ksync ready"
        );
        Ok(app)
    }

    pub fn paths(&self) -> &KsyncPaths {
        &self.paths
    }

    pub fn config(&self) -> &KsyncConfig {
        &self.config
    }

    pub fn ai_status(&self) -> AiStatus {
        self.gateway.ai_status()
    }

    /// A fresh orchestrator for one interview.
    pub fn orchestrator(&self) -> InterviewOrchestrator {
        InterviewOrchestrator::new(
            self.gateway.clone(),
            self.sessions.clone(),
            self.articles.clone(),
            self.config.interview.clone(),
        )
    }

    pub fn knowledge_base(&self) -> KnowledgeBase {
        KnowledgeBase::new(self.sessions.clone(), self.articles.clone())
    }

    pub fn exporter(&self) -> Result<ArticleExporter> {
        ArticleExporter::new()
    }
}
