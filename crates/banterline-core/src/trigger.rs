//! Engagement trigger policy.
//!
//! One pure decision function mapping an event's features to "ignore",
//! "react only", or "react and reply". Randomness is injected so the
//! policy is unit-testable with a seeded generator.

use banterline_types::config::TriggerConfig;
use banterline_types::event::{EventFeatures, TriggerDecision};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Decides whether an incoming event deserves a reaction and/or a reply.
#[derive(Debug, Clone)]
pub struct TriggerPolicy {
    config: TriggerConfig,
}

impl TriggerPolicy {
    pub fn new(config: TriggerConfig) -> Self {
        Self { config }
    }

    /// Classify one event.
    ///
    /// The reaction draw happens exactly once per event and is
    /// independent of the reply outcome. The reply rules form a
    /// priority cascade: mention beats keyword beats attachment beats
    /// idle, and only the first applicable rule draws. The branches are
    /// alternatives, not independent chances.
    pub fn decide<R: Rng + ?Sized>(
        &self,
        features: &EventFeatures,
        rng: &mut R,
    ) -> TriggerDecision {
        let reaction_symbol = if rng.random::<f64>() < self.config.p_react {
            self.config.reaction_symbols.choose(rng).cloned()
        } else {
            None
        };

        let should_reply = if features.mentions_agent {
            true
        } else if self.matches_trigger_word(&features.text_lowercased) {
            rng.random::<f64>() < self.config.p_keyword
        } else if features.has_attachments {
            rng.random::<f64>() < self.config.p_attachment
        } else {
            rng.random::<f64>() < self.config.p_idle
        };

        TriggerDecision {
            should_react: reaction_symbol.is_some(),
            reaction_symbol,
            should_reply,
        }
    }

    fn matches_trigger_word(&self, text_lowercased: &str) -> bool {
        self.config
            .trigger_words
            .iter()
            .any(|word| text_lowercased.contains(word.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn features(
        mentions_agent: bool,
        text: &str,
        has_attachments: bool,
    ) -> EventFeatures {
        EventFeatures {
            mentions_agent,
            text_lowercased: text.to_lowercase(),
            has_attachments,
            is_supported_image: false,
        }
    }

    fn policy(config: TriggerConfig) -> TriggerPolicy {
        TriggerPolicy::new(config)
    }

    #[test]
    fn test_mention_always_replies() {
        let policy = policy(TriggerConfig::default());
        let features = features(true, "completely unremarkable", false);

        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let decision = policy.decide(&features, &mut rng);
            assert!(decision.should_reply, "seed {seed} suppressed a mention reply");
        }
    }

    #[test]
    fn test_keyword_branch_shadows_attachment_branch() {
        // Keyword draw can never fire, attachment draw always would.
        // With both a keyword match and attachments present, the reply
        // must still be decided by the keyword branch alone.
        let policy = policy(TriggerConfig {
            p_keyword: 0.0,
            p_attachment: 1.0,
            p_idle: 1.0,
            ..TriggerConfig::default()
        });
        let features = features(false, "lol look at this", true);

        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let decision = policy.decide(&features, &mut rng);
            assert!(!decision.should_reply, "seed {seed} leaked into a later branch");
        }
    }

    #[test]
    fn test_attachment_branch_applies_without_keyword() {
        let policy = policy(TriggerConfig {
            p_attachment: 1.0,
            ..TriggerConfig::default()
        });
        let features = features(false, "completely unremarkable", true);

        let mut rng = StdRng::seed_from_u64(7);
        assert!(policy.decide(&features, &mut rng).should_reply);
    }

    #[test]
    fn test_idle_branch_is_last_resort() {
        let quiet = features(false, "completely unremarkable", false);

        let always = policy(TriggerConfig {
            p_idle: 1.0,
            ..TriggerConfig::default()
        });
        let never = policy(TriggerConfig {
            p_idle: 0.0,
            ..TriggerConfig::default()
        });

        let mut rng = StdRng::seed_from_u64(7);
        assert!(always.decide(&quiet, &mut rng).should_reply);
        assert!(!never.decide(&quiet, &mut rng).should_reply);
    }

    #[test]
    fn test_reaction_is_independent_of_reply() {
        let policy = policy(TriggerConfig {
            p_react: 1.0,
            p_keyword: 0.0,
            p_attachment: 0.0,
            p_idle: 0.0,
            ..TriggerConfig::default()
        });
        let features = features(false, "completely unremarkable", false);

        let mut rng = StdRng::seed_from_u64(7);
        let decision = policy.decide(&features, &mut rng);
        assert!(decision.should_react);
        assert!(!decision.should_reply);

        let symbol = decision.reaction_symbol.expect("reaction symbol drawn");
        assert!(TriggerConfig::default().reaction_symbols.contains(&symbol));
    }

    #[test]
    fn test_no_reaction_without_symbols() {
        let policy = policy(TriggerConfig {
            p_react: 1.0,
            reaction_symbols: Vec::new(),
            ..TriggerConfig::default()
        });
        let features = features(false, "anything", false);

        let mut rng = StdRng::seed_from_u64(7);
        let decision = policy.decide(&features, &mut rng);
        assert!(!decision.should_react);
        assert!(decision.reaction_symbol.is_none());
    }

    #[test]
    fn test_reaction_suppressed_at_zero_probability() {
        let policy = policy(TriggerConfig {
            p_react: 0.0,
            ..TriggerConfig::default()
        });
        let features = features(true, "hey", false);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert!(!policy.decide(&features, &mut rng).should_react);
        }
    }
}
