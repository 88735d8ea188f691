//! Interactive chat REPL.
//!
//! Each console line becomes one chat event; slash commands map to the
//! synthetic-prompt requests and the administrative surface. The REPL
//! is the reference dispatcher for the core: a real chat-platform
//! client would drive the same gateway the same way.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use std::path::Path;
use std::sync::Arc;

use banterline_core::engine::{ChatEngine, ChatPrompt};
use banterline_core::gateway::ChatGateway;
use banterline_core::persona;
use banterline_core::postprocess;
use banterline_core::store::{ConversationStore, sweep_loop};
use banterline_core::trigger::TriggerPolicy;
use banterline_infra::config::api_key_from_env;
use banterline_infra::image::HttpImageFetcher;
use banterline_infra::llm::GeminiProvider;
use banterline_types::config::AppConfig;
use banterline_types::event::{AttachmentRef, ChatEvent, EventOutcome};
use banterline_types::participant::ParticipantId;

use super::console_transport::ConsoleTransport;
use super::{AnyStore, open_store, stats};

pub async fn run(config: AppConfig, data_dir: &Path, user: u64) -> anyhow::Result<()> {
    let api_key = api_key_from_env(&config.model).ok_or_else(|| {
        anyhow::anyhow!(
            "no model API key found; set {} and try again",
            config.model.api_key_env
        )
    })?;
    let provider =
        GeminiProvider::new(&config.model, config.persona.system_prompt.clone(), api_key);

    match open_store(&config, data_dir).await? {
        AnyStore::Memory(store) => run_repl(store, provider, config, user).await,
        AnyStore::Sqlite(store) => run_repl(store, provider, config, user).await,
    }
}

async fn run_repl<S>(
    store: Arc<S>,
    provider: GeminiProvider,
    config: AppConfig,
    user: u64,
) -> anyhow::Result<()>
where
    S: ConversationStore + 'static,
{
    let cancel = CancellationToken::new();
    let sweeper = tokio::spawn(sweep_loop(
        store.clone(),
        config.memory.sweep_interval(),
        cancel.clone(),
    ));

    let engine = ChatEngine::new(
        store.clone(),
        provider,
        config.persona.clone(),
        config.model.timeout(),
    );
    let gateway = ChatGateway::new(
        TriggerPolicy::new(config.triggers.clone()),
        engine,
        HttpImageFetcher::new(),
    );
    let transport = ConsoleTransport::new(config.persona.name.clone());
    let participant = ParticipantId(user);

    info!(participant = %participant, backend = %config.memory.backend, "chat session started");
    transport.banner();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            if matches!(command, "quit" | "exit") {
                break;
            }
            run_command(command, &gateway, store.as_ref(), &config, participant, &transport)
                .await;
            continue;
        }

        let event = message_event(&config, participant, &line);
        let outcome = gateway.handle_event(&event).await;
        emit_outcome(&transport, outcome).await;
    }

    cancel.cancel();
    let _ = sweeper.await;
    Ok(())
}

async fn emit_outcome(transport: &ConsoleTransport, outcome: EventOutcome) {
    if let Some(symbol) = &outcome.reaction {
        // A lost reaction is invisible by design.
        if let Err(err) = transport.add_reaction(symbol) {
            debug!(error = %err, "reaction not attached");
        }
    }
    if let Some(reply) = &outcome.reply {
        transport.deliver_reply(reply).await;
    }
}

async fn run_command<S>(
    command: &str,
    gateway: &ChatGateway<S, GeminiProvider, HttpImageFetcher>,
    store: &S,
    config: &AppConfig,
    participant: ParticipantId,
    transport: &ConsoleTransport,
) where
    S: ConversationStore,
{
    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let rest: Vec<&str> = words.collect();

    let command_prompt = |prompt: String| {
        let request = ChatPrompt::command(participant, prompt);
        if config.persona.owner_id == Some(participant) {
            request.privileged()
        } else {
            request
        }
    };

    match name {
        "roast" => {
            let target = rest.first().copied().unwrap_or("me");
            let reply = gateway
                .engine()
                .respond(command_prompt(persona::roast_prompt(target)))
                .await;
            transport.deliver_reply(&reply).await;
        }

        "rate" => {
            let target = rest.first().copied().unwrap_or("me");
            let reply = gateway
                .engine()
                .respond(command_prompt(persona::rate_prompt(target)))
                .await;
            transport.deliver_reply(&reply).await;
        }

        "ship" => {
            let first = rest.first().copied().unwrap_or("me");
            let second = rest.get(1).copied().unwrap_or("me");
            let reply = gateway
                .engine()
                .respond(command_prompt(persona::ship_prompt(first, second)))
                .await;
            transport.deliver_reply(&reply).await;
        }

        "ask" => {
            if rest.is_empty() {
                transport.note("usage: /ask <question>");
                return;
            }
            let reply = gateway
                .engine()
                .respond(command_prompt(persona::ask_prompt(&rest.join(" "))))
                .await;
            transport.deliver_reply(&reply).await;
        }

        "truth" => {
            let reply = gateway
                .engine()
                .respond(command_prompt(persona::truth_prompt()))
                .await;
            transport.deliver_reply(&format!("TRUTH: {reply}")).await;
        }

        "dare" => {
            let reply = gateway
                .engine()
                .respond(command_prompt(persona::dare_prompt()))
                .await;
            transport.deliver_reply(&format!("DARE: {reply}")).await;
        }

        "rename" => {
            let target = rest.first().copied().unwrap_or("me");
            let raw = gateway
                .engine()
                .respond(command_prompt(persona::rename_prompt(target)))
                .await;
            match postprocess::apply_display_name(&raw) {
                Ok(nickname) => transport.confirm_rename(target, &nickname),
                Err(err) => {
                    debug!(error = %err, "nickname edit failed");
                    transport.deliver_reply(postprocess::EDIT_FAILURE_REPLY).await;
                }
            }
        }

        "img" => {
            let Some(url) = rest.first() else {
                transport.note("usage: /img <url> [caption]");
                return;
            };
            let caption = rest[1..].join(" ");
            let mut event = message_event(config, participant, &caption);
            event.attachments.push(AttachmentRef {
                filename: filename_of(url),
                url: url.to_string(),
            });
            let outcome = gateway.handle_event(&event).await;
            emit_outcome(transport, outcome).await;
        }

        "stats" => {
            if let Err(err) = stats::render_counts(store).await {
                transport.note(&format!("stats unavailable: {err}"));
            }
        }

        "wipe" => {
            if config.persona.owner_id != Some(participant) {
                transport.note("Nice try. You are not the boss of me. 🙄");
                return;
            }
            let target = rest.first().and_then(|raw| raw.parse::<u64>().ok());
            let result = match target {
                Some(id) => store.clear(ParticipantId(id)).await,
                None => store.clear_all().await,
            };
            match result {
                Ok(()) => {
                    info!(?target, "conversation history wiped");
                    transport.note(match target {
                        Some(_) => "Forgot them. Who was that again?",
                        None => "Memory wiped. Who are you people? 🤕",
                    });
                }
                Err(err) => {
                    warn!(error = %err, "wipe failed");
                    transport.note("The memories refuse to leave.");
                }
            }
        }

        other => transport.note(&format!("unknown command: /{other}")),
    }
}

/// Build a plain-message event from a console line.
fn message_event(config: &AppConfig, participant: ParticipantId, text: &str) -> ChatEvent {
    let mention = format!("@{}", config.persona.name.to_lowercase());
    ChatEvent {
        participant_id: participant,
        text: text.to_string(),
        attachments: Vec::new(),
        mentions_agent: text.to_lowercase().contains(&mention),
    }
}

/// The last path segment of a URL, for attachment naming.
fn filename_of(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .unwrap_or(url)
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("attachment")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_event_detects_mentions() {
        let config = AppConfig::default();
        let hit = message_event(&config, ParticipantId(1), "hey @Banter what gives");
        assert!(hit.mentions_agent);

        let miss = message_event(&config, ParticipantId(1), "banter without the at-sign");
        assert!(!miss.mentions_agent);
    }

    #[test]
    fn test_filename_of_url() {
        assert_eq!(filename_of("https://cdn.example/a/cat.png?w=64"), "cat.png");
        assert_eq!(filename_of("https://cdn.example/"), "attachment");
    }
}
