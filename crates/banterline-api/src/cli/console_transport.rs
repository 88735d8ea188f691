//! Console chat transport.
//!
//! Plays the role a chat-platform client would: it delivers replies
//! (with simulated typing), attaches reactions, and applies nicknames.
//! Reaction failures are swallowed by the caller; nickname failures
//! degrade to a fixed apologetic line.

use console::style;

use banterline_core::pacing::reply_delay;
use banterline_types::error::ReactionError;

pub struct ConsoleTransport {
    agent_name: String,
}

impl ConsoleTransport {
    pub fn new(agent_name: String) -> Self {
        Self { agent_name }
    }

    pub fn banner(&self) {
        println!();
        println!(
            "  {} {} is listening. Say hi, or mention @{} to get a reply for sure.",
            style("✨").bold(),
            style(&self.agent_name).magenta().bold(),
            self.agent_name.to_lowercase(),
        );
        println!(
            "  {} /roast /rate /ship /ask /truth /dare /rename /img /stats /wipe /quit",
            style("commands:").dim()
        );
        println!();
    }

    /// Deliver a reply after a length-proportional typing pause.
    pub async fn deliver_reply(&self, reply: &str) {
        tokio::time::sleep(reply_delay(reply)).await;
        println!(
            "{} {}",
            style(format!("{}:", self.agent_name)).magenta().bold(),
            reply
        );
    }

    /// Attach a reaction symbol to the last message.
    pub fn add_reaction(&self, symbol: &str) -> Result<(), ReactionError> {
        println!("  {}", style(format!("[{symbol}]")).dim());
        Ok(())
    }

    /// Announce a successful nickname change.
    pub fn confirm_rename(&self, target: &str, nickname: &str) {
        println!(
            "{} There. Much better. {} is now {}. ✨",
            style(format!("{}:", self.agent_name)).magenta().bold(),
            target,
            style(nickname).bold(),
        );
    }

    /// A dim system-side line (admin feedback, refusals).
    pub fn note(&self, message: &str) {
        println!("  {}", style(message).dim());
    }
}
