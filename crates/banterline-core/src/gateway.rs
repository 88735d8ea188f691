//! Per-event request handler.
//!
//! The transport dispatches each incoming message here as an
//! independent unit of work: classify it, fetch an image payload if one
//! is worth fetching, and run the exchange. The RNG is only touched
//! synchronously, so handler futures stay `Send` and events for
//! different participants can be in flight concurrently.

use banterline_types::event::{ChatEvent, EventFeatures, EventOutcome, TriggerDecision};
use rand::Rng;

use crate::engine::{ChatEngine, ChatPrompt};
use crate::image::ImageFetcher;
use crate::llm::ModelProvider;
use crate::store::ConversationStore;
use crate::trigger::TriggerPolicy;

/// Handles one chat event end to end: trigger decision, image fetch,
/// context assembly, reply.
pub struct ChatGateway<S, P, F> {
    policy: TriggerPolicy,
    engine: ChatEngine<S, P>,
    fetcher: F,
}

impl<S, P, F> ChatGateway<S, P, F>
where
    S: ConversationStore,
    P: ModelProvider,
    F: ImageFetcher,
{
    pub fn new(policy: TriggerPolicy, engine: ChatEngine<S, P>, fetcher: F) -> Self {
        Self {
            policy,
            engine,
            fetcher,
        }
    }

    /// The engine, for command-style requests that bypass the trigger
    /// policy (roast, rename, and friends).
    pub fn engine(&self) -> &ChatEngine<S, P> {
        &self.engine
    }

    /// Handle one event with ambient randomness.
    pub async fn handle_event(&self, event: &ChatEvent) -> EventOutcome {
        let features = EventFeatures::from_event(event);
        // The thread-local RNG must not live across an await point.
        let decision = {
            let mut rng = rand::rng();
            self.policy.decide(&features, &mut rng)
        };
        self.dispatch(event, &features, decision).await
    }

    /// Handle one event with an injected generator (deterministic tests).
    pub async fn handle_event_with_rng<R: Rng + ?Sized + Send>(
        &self,
        event: &ChatEvent,
        rng: &mut R,
    ) -> EventOutcome {
        let features = EventFeatures::from_event(event);
        let decision = self.policy.decide(&features, rng);
        self.dispatch(event, &features, decision).await
    }

    async fn dispatch(
        &self,
        event: &ChatEvent,
        features: &EventFeatures,
        decision: TriggerDecision,
    ) -> EventOutcome {
        let reaction = decision.reaction_symbol;

        if !decision.should_reply {
            return EventOutcome {
                reply: None,
                reaction,
            };
        }

        // Only supported image types are worth fetching; a failed fetch
        // just means the exchange proceeds without the image.
        let image = if features.is_supported_image {
            match event.attachments.iter().find(|a| a.is_supported_image()) {
                Some(attachment) => self.fetcher.fetch(&attachment.url).await,
                None => None,
            }
        } else {
            None
        };

        let privileged = self.engine.persona().owner_id == Some(event.participant_id);

        let text = if event.text.trim().is_empty() {
            None
        } else {
            Some(event.text.clone())
        };

        let prompt = ChatPrompt {
            participant_id: event.participant_id,
            text,
            image,
            override_prompt: None,
            privileged,
        };

        EventOutcome {
            reply: Some(self.engine.respond(prompt).await),
            reaction,
        }
    }
}
