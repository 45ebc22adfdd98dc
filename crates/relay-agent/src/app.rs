//! Component wiring.

use std::sync::Arc;

use relay_llm::{ChatModel, GeminiConfig, GeminiModel};
use relay_runtime::{AdminCommands, KnowledgeStore, MessagePipeline, SessionRegistry};
use relay_server::RelayServer;
use relay_settings::{EnvFileChannelStore, RelaySettings};

/// Everything the process runs, wired together.
pub struct Services {
    /// Display-facing server; its registry is the pipeline's display sink.
    pub server: RelayServer,
    /// Serialized message pipeline.
    pub pipeline: Arc<MessagePipeline>,
    /// Slash command backends.
    pub commands: AdminCommands,
    /// Shared knowledge store.
    pub knowledge: Arc<KnowledgeStore>,
}

/// Gemini client for the configured model, with the persona as system
/// instruction.
pub fn gemini_model(settings: &RelaySettings, persona: String) -> GeminiModel {
    let gemini = &settings.gemini;
    let mut config = GeminiConfig::new(gemini.api_key.clone(), gemini.model.clone());
    config.base_url.clone_from(&gemini.base_url);
    config.system_instruction = Some(persona);
    config.max_output_tokens = gemini.max_output_tokens;
    config.temperature = gemini.temperature;
    GeminiModel::new(config)
}

/// Build the shared stores, the pipeline, and the server.
///
/// The active channel starts from `CHANNEL_ID` and is persisted back to the
/// configured env file.
pub fn build_services(settings: &RelaySettings, model: Arc<dyn ChatModel>) -> Services {
    let server = RelayServer::new(settings.server.clone());
    let sessions = Arc::new(SessionRegistry::new());
    let knowledge = Arc::new(KnowledgeStore::new(settings.paths.knowledge_dir()));
    let channels = Arc::new(EnvFileChannelStore::from_env(settings.paths.env_file()));

    let pipeline = MessagePipeline::new(
        model,
        sessions.clone(),
        knowledge.clone(),
        server.registry().clone(),
        channels.clone(),
    )
    .with_model_timeout(settings.pipeline.model_timeout());

    let commands = AdminCommands::new(channels, sessions, knowledge.clone());

    Services {
        server,
        pipeline: Arc::new(pipeline),
        commands,
        knowledge,
    }
}
