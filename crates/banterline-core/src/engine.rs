//! Context assembly and model dispatch.
//!
//! [`ChatEngine`] turns one request into one ordered prompt payload:
//! the participant's recent history followed by exactly one new user
//! turn. On success the exchange is persisted; on any failure (adapter
//! error, timeout, persistence) the caller gets the persona's fixed
//! fallback reply and the store is left as it was before the call.

use banterline_types::config::PersonaConfig;
use banterline_types::error::{ModelError, StoreError};
use banterline_types::participant::ParticipantId;
use banterline_types::turn::{ContentPart, ImageAttachment, PromptTurn, TurnRole};
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;

use std::sync::Arc;
use std::time::Duration;

use crate::llm::ModelProvider;
use crate::persona;
use crate::store::ConversationStore;

/// One request into the assembler.
#[derive(Debug, Clone)]
pub struct ChatPrompt {
    pub participant_id: ParticipantId,
    /// The participant's message text, if any.
    pub text: Option<String>,
    /// A fetched inline image, if any.
    pub image: Option<ImageAttachment>,
    /// A command-style synthetic prompt. When set, text and image are
    /// ignored and the exchange is never persisted.
    pub override_prompt: Option<String>,
    /// Whether the requester is the configured privileged user.
    pub privileged: bool,
}

impl ChatPrompt {
    /// A plain text message.
    pub fn text(participant_id: ParticipantId, text: impl Into<String>) -> Self {
        Self {
            participant_id,
            text: Some(text.into()),
            image: None,
            override_prompt: None,
            privileged: false,
        }
    }

    /// A message that carried only an image.
    pub fn image_only(participant_id: ParticipantId, image: ImageAttachment) -> Self {
        Self {
            participant_id,
            text: None,
            image: Some(image),
            override_prompt: None,
            privileged: false,
        }
    }

    /// A command-style synthetic prompt.
    pub fn command(participant_id: ParticipantId, prompt: impl Into<String>) -> Self {
        Self {
            participant_id,
            text: None,
            image: None,
            override_prompt: Some(prompt.into()),
            privileged: false,
        }
    }

    /// Attach a fetched image to the prompt.
    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    /// Mark the requester as the privileged user.
    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }
}

/// Why an exchange failed. Never surfaces past [`ChatEngine::respond`].
#[derive(Debug, Error)]
pub enum RespondError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Assembles prompt payloads and relays model replies.
pub struct ChatEngine<S, P> {
    store: Arc<S>,
    provider: P,
    persona: PersonaConfig,
    timeout: Duration,
    /// Per-participant turn ordering guards. Held across the model call
    /// so concurrent requests for one participant append in submission
    /// order; unrelated participants never wait on each other.
    turn_guards: DashMap<ParticipantId, Arc<Mutex<()>>>,
}

impl<S, P> ChatEngine<S, P>
where
    S: ConversationStore,
    P: ModelProvider,
{
    pub fn new(store: Arc<S>, provider: P, persona: PersonaConfig, timeout: Duration) -> Self {
        Self {
            store,
            provider,
            persona,
            timeout,
            turn_guards: DashMap::new(),
        }
    }

    pub fn persona(&self) -> &PersonaConfig {
        &self.persona
    }

    /// Run one exchange, degrading every failure to the fallback reply.
    pub async fn respond(&self, prompt: ChatPrompt) -> String {
        match self.try_respond(&prompt).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(
                    participant = %prompt.participant_id,
                    provider = self.provider.name(),
                    error = %err,
                    "model exchange failed, using fallback reply"
                );
                self.persona.fallback_reply.clone()
            }
        }
    }

    /// The fallible exchange. Public so tests can observe failure kinds;
    /// production callers go through [`respond`](Self::respond).
    pub async fn try_respond(&self, prompt: &ChatPrompt) -> Result<String, RespondError> {
        let guard = Arc::clone(
            &*self
                .turn_guards
                .entry(prompt.participant_id)
                .or_default(),
        );
        let _ordered = guard.lock().await;

        let history = self.store.read_recent(prompt.participant_id).await?;

        let mut payload: Vec<PromptTurn> = history.iter().map(PromptTurn::from).collect();
        payload.push(PromptTurn::user(assemble_parts(&self.persona, prompt)));

        let reply = match tokio::time::timeout(self.timeout, self.provider.generate(&payload)).await
        {
            Ok(result) => result?,
            Err(_) => return Err(ModelError::Timeout.into()),
        };

        // Persist the exchange, user turn first. Command prompts are
        // one-shot and never enter the log.
        if prompt.override_prompt.is_none() {
            let user_text = prompt
                .text
                .clone()
                .unwrap_or_else(|| persona::IMAGE_PLACEHOLDER.to_string());
            self.store
                .append(
                    prompt.participant_id,
                    TurnRole::User,
                    vec![ContentPart::text(user_text)],
                )
                .await?;
            self.store
                .append(
                    prompt.participant_id,
                    TurnRole::Model,
                    vec![ContentPart::text(reply.clone())],
                )
                .await?;
        }

        Ok(reply)
    }
}

/// Build the new turn's parts for one request.
///
/// Fixed precedence: identity note (privileged requests only), then
/// either the synthetic prompt plus style reminder, or the message
/// text and/or image with its annotations.
pub fn assemble_parts(persona: &PersonaConfig, prompt: &ChatPrompt) -> Vec<ContentPart> {
    let mut parts = Vec::new();

    if prompt.privileged {
        if let Some(note) = persona::identity_note(persona) {
            parts.push(ContentPart::text(note));
        }
    }

    if let Some(override_prompt) = &prompt.override_prompt {
        parts.push(ContentPart::text(override_prompt.clone()));
        parts.push(ContentPart::text(persona::style_reminder(persona)));
        return parts;
    }

    if let Some(text) = &prompt.text {
        parts.push(ContentPart::text(text.clone()));
    }
    if let Some(image) = &prompt.image {
        parts.push(ContentPart::image(image.clone()));
        parts.push(ContentPart::text(persona::IMAGE_SENT_ANNOTATION));
        if prompt.text.is_none() {
            parts.push(ContentPart::text(persona::IMAGE_COMMENT_INSTRUCTION));
        }
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryConversationStore;

    use banterline_types::config::MemoryConfig;

    fn memory_store() -> Arc<MemoryConversationStore> {
        Arc::new(MemoryConversationStore::new(&MemoryConfig::default()))
    }

    fn creator_persona() -> PersonaConfig {
        PersonaConfig {
            creator_username: Some("sainnee".to_string()),
            creator_alias: Some("Sane".to_string()),
            owner_id: Some(ParticipantId(1)),
            ..PersonaConfig::default()
        }
    }

    async fn turn_texts(store: &MemoryConversationStore, id: u64) -> Vec<String> {
        store
            .read_recent(ParticipantId(id))
            .await
            .unwrap()
            .iter()
            .map(|t| t.parts[0].as_text().unwrap().to_string())
            .collect()
    }

    /// Test double that replies, fails, or hangs on demand.
    struct ScriptedProvider {
        script: Script,
    }

    enum Script {
        Reply(String),
        Fail,
        Hang,
    }

    impl ScriptedProvider {
        fn replying(text: &str) -> Self {
            Self {
                script: Script::Reply(text.to_string()),
            }
        }

        fn failing() -> Self {
            Self { script: Script::Fail }
        }

        fn hanging() -> Self {
            Self { script: Script::Hang }
        }
    }

    impl ModelProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, _turns: &[PromptTurn]) -> Result<String, ModelError> {
            match &self.script {
                Script::Reply(text) => Ok(text.clone()),
                Script::Fail => Err(ModelError::Api {
                    status: 500,
                    message: "backend exploded".to_string(),
                }),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(ModelError::Empty)
                }
            }
        }
    }

    /// Echoes the last user text back, after a short think.
    struct EchoProvider;

    impl ModelProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, turns: &[PromptTurn]) -> Result<String, ModelError> {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let last = turns
                .last()
                .and_then(|t| t.parts.first())
                .and_then(ContentPart::as_text)
                .unwrap_or_default();
            Ok(format!("echo:{last}"))
        }
    }

    /// Records every payload it is asked to generate for.
    struct CapturingProvider {
        seen: std::sync::Mutex<Vec<Vec<PromptTurn>>>,
    }

    impl CapturingProvider {
        fn new() -> Self {
            Self {
                seen: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    impl ModelProvider for CapturingProvider {
        fn name(&self) -> &str {
            "capturing"
        }

        async fn generate(&self, turns: &[PromptTurn]) -> Result<String, ModelError> {
            self.seen.lock().unwrap().push(turns.to_vec());
            Ok("captured".to_string())
        }
    }

    #[tokio::test]
    async fn test_successful_exchange_persists_both_turns() {
        let store = memory_store();
        let engine = ChatEngine::new(
            store.clone(),
            ScriptedProvider::replying("hey 💀"),
            PersonaConfig::default(),
            Duration::from_secs(5),
        );

        let reply = engine
            .respond(ChatPrompt::text(ParticipantId(42), "hello"))
            .await;
        assert_eq!(reply, "hey 💀");

        let turns = store.read_recent(ParticipantId(42)).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, TurnRole::User);
        assert_eq!(turns[0].parts[0].as_text(), Some("hello"));
        assert_eq!(turns[1].role, TurnRole::Model);
        assert_eq!(turns[1].parts[0].as_text(), Some("hey 💀"));
    }

    #[tokio::test]
    async fn test_adapter_failure_returns_fallback_without_appending() {
        let store = memory_store();
        let persona = PersonaConfig::default();
        let fallback = persona.fallback_reply.clone();
        let engine = ChatEngine::new(
            store.clone(),
            ScriptedProvider::failing(),
            persona,
            Duration::from_secs(5),
        );

        let reply = engine
            .respond(ChatPrompt::text(ParticipantId(7), "hi"))
            .await;
        assert_eq!(reply, fallback);
        assert!(store.read_recent(ParticipantId(7)).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_takes_the_fallback_path() {
        let store = memory_store();
        let persona = PersonaConfig::default();
        let fallback = persona.fallback_reply.clone();
        let engine = ChatEngine::new(
            store.clone(),
            ScriptedProvider::hanging(),
            persona,
            Duration::from_millis(50),
        );

        let reply = engine
            .respond(ChatPrompt::text(ParticipantId(7), "anyone home?"))
            .await;
        assert_eq!(reply, fallback);
        assert!(store.read_recent(ParticipantId(7)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_error_kind() {
        let engine = ChatEngine::new(
            memory_store(),
            ScriptedProvider::hanging(),
            PersonaConfig::default(),
            Duration::from_millis(10),
        );

        let err = engine
            .try_respond(&ChatPrompt::text(ParticipantId(7), "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, RespondError::Model(ModelError::Timeout)));
    }

    #[tokio::test]
    async fn test_command_prompt_never_persists() {
        let store = memory_store();
        let engine = ChatEngine::new(
            store.clone(),
            ScriptedProvider::replying("Snack Thief"),
            PersonaConfig::default(),
            Duration::from_secs(5),
        );

        let reply = engine
            .respond(ChatPrompt::command(ParticipantId(3), "pick a nickname"))
            .await;
        assert_eq!(reply, "Snack Thief");
        assert!(store.read_recent(ParticipantId(3)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_command_prompt_failure_also_leaves_store_alone() {
        let store = memory_store();
        let engine = ChatEngine::new(
            store.clone(),
            ScriptedProvider::failing(),
            PersonaConfig::default(),
            Duration::from_secs(5),
        );

        engine
            .respond(ChatPrompt::command(ParticipantId(3), "pick a nickname"))
            .await;
        assert!(store.read_recent(ParticipantId(3)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_image_only_persists_placeholder() {
        let store = memory_store();
        let engine = ChatEngine::new(
            store.clone(),
            ScriptedProvider::replying("nice pixels"),
            PersonaConfig::default(),
            Duration::from_secs(5),
        );

        let image = ImageAttachment::from_bytes("image/png", b"pixels");
        engine
            .respond(ChatPrompt::image_only(ParticipantId(5), image))
            .await;

        let texts = turn_texts(&store, 5).await;
        assert_eq!(texts, vec![persona::IMAGE_PLACEHOLDER, "nice pixels"]);
    }

    #[tokio::test]
    async fn test_payload_is_history_plus_one_user_turn() {
        let store = memory_store();
        store
            .append(
                ParticipantId(9),
                TurnRole::User,
                vec![ContentPart::text("earlier")],
            )
            .await
            .unwrap();
        store
            .append(
                ParticipantId(9),
                TurnRole::Model,
                vec![ContentPart::text("indeed")],
            )
            .await
            .unwrap();

        let provider = CapturingProvider::new();
        let engine = ChatEngine::new(
            store,
            provider,
            PersonaConfig::default(),
            Duration::from_secs(5),
        );
        engine
            .respond(ChatPrompt::text(ParticipantId(9), "and now"))
            .await;

        // Reach through the engine to the captured payload.
        let seen = engine.provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let payload = &seen[0];
        assert_eq!(payload.len(), 3);
        assert_eq!(payload[0].parts[0].as_text(), Some("earlier"));
        assert_eq!(payload[1].role, TurnRole::Model);
        assert_eq!(payload[2].role, TurnRole::User);
        assert_eq!(payload[2].parts[0].as_text(), Some("and now"));
    }

    #[tokio::test]
    async fn test_identity_note_is_sent_but_never_stored() {
        let store = memory_store();
        let engine = ChatEngine::new(
            store.clone(),
            CapturingProvider::new(),
            creator_persona(),
            Duration::from_secs(5),
        );

        engine
            .respond(ChatPrompt::text(ParticipantId(1), "hey").privileged())
            .await;

        let seen = engine.provider.seen.lock().unwrap();
        let new_turn = seen[0].last().unwrap();
        assert!(new_turn.parts[0].as_text().unwrap().contains("your creator"));

        drop(seen);
        let texts = turn_texts(&store, 1).await;
        assert_eq!(texts, vec!["hey", "captured"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_participant_requests_append_in_order() {
        let store = memory_store();
        let engine = ChatEngine::new(
            store.clone(),
            EchoProvider,
            PersonaConfig::default(),
            Duration::from_secs(5),
        );

        let id = ParticipantId(11);
        tokio::join!(
            engine.respond(ChatPrompt::text(id, "first")),
            engine.respond(ChatPrompt::text(id, "second")),
        );

        let texts = turn_texts(&store, 11).await;
        assert_eq!(texts, vec!["first", "echo:first", "second", "echo:second"]);
    }

    #[test]
    fn test_assemble_text_and_image_ordering() {
        let persona = PersonaConfig::default();
        let image = ImageAttachment::from_bytes("image/png", b"pixels");
        let prompt =
            ChatPrompt::text(ParticipantId(1), "caption").with_image(image.clone());

        let parts = assemble_parts(&persona, &prompt);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].as_text(), Some("caption"));
        assert!(matches!(parts[1], ContentPart::Image { .. }));
        assert_eq!(parts[2].as_text(), Some(persona::IMAGE_SENT_ANNOTATION));
    }

    #[test]
    fn test_assemble_image_only_adds_comment_instruction() {
        let persona = PersonaConfig::default();
        let image = ImageAttachment::from_bytes("image/png", b"pixels");
        let prompt = ChatPrompt::image_only(ParticipantId(1), image);

        let parts = assemble_parts(&persona, &prompt);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].as_text(), Some(persona::IMAGE_COMMENT_INSTRUCTION));
    }

    #[test]
    fn test_assemble_override_ignores_text_and_image() {
        let persona = PersonaConfig::default();
        let mut prompt = ChatPrompt::command(ParticipantId(1), "do the thing");
        prompt.text = Some("ignored".to_string());
        prompt.image = Some(ImageAttachment::from_bytes("image/png", b"ignored"));

        let parts = assemble_parts(&persona, &prompt);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].as_text(), Some("do the thing"));
        assert!(parts[1].as_text().unwrap().starts_with("(Reply as"));
    }

    #[test]
    fn test_assemble_identity_note_leads_for_privileged_requests() {
        let persona = creator_persona();
        let prompt = ChatPrompt::text(ParticipantId(1), "hello").privileged();

        let parts = assemble_parts(&persona, &prompt);
        assert!(parts[0].as_text().unwrap().starts_with("(System note:"));
        assert_eq!(parts[1].as_text(), Some("hello"));

        // Without creator details there is nothing to disclose.
        let bare = assemble_parts(&PersonaConfig::default(), &prompt);
        assert_eq!(bare[0].as_text(), Some("hello"));
    }
}
