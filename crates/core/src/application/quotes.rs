// Ripley-style flavor text, keyed by effort tier
// Calm, procedural, and rule-following.

use crate::domain::EffortTier;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use std::sync::Mutex;

pub const GOOD_EFFORT_QUOTES: &[&str] = &[
    "Now we're getting somewhere — that's the baseline competence I expect.",
    "Not bad — you actually *tried*.",
    "Finally, some effort worth reporting.",
    "Precision, speed, and efficiency — looks like someone's awake.",
    "That's how we do it — no shortcuts, no excuses.",
    "You followed procedure. I approve.",
    "Effort noted and logged. Keep it consistent.",
];

pub const MEDIUM_EFFORT_QUOTES: &[&str] = &[
    "Hmm… you're getting there, but don't think I won't notice the shortcuts.",
    "I see the work, but it's half-baked.",
    "Mediocre, but technically acceptable.",
    "Are you actually trying, or just going through the motions?",
    "Not the worst, but I've seen better from a fresh context.",
    "Decent. I'll allow it… this time.",
    "I can work with this, though it smells like token padding.",
    "Average effort — report submitted but not impressive.",
    "You've barely scratched the surface of competence.",
    "Followed the rules, but where's the spark?",
];

pub const POOR_EFFORT_QUOTES: &[&str] = &[
    "What is this? Did you even read the instructions?",
    "I don't trust claims — prove it, properly.",
    "Tokens wasted, time wasted, and effort barely measurable.",
    "You're phoning it in, and I can tell.",
    "This is not baseline competence — start over.",
    "Airlock checks first, answers second. You failed both.",
    "Sloppy, incomplete, and unnecessary verbosity.",
    "I expected more from Sonnet 4.5 than this.",
    "Are you trying to look busy? Because it's not working.",
    "Do better. Or I will notice.",
    "Half-hearted response logged. Not acceptable.",
    "I've seen lower-effort outputs from a malfunctioning interface, and this is close.",
    "Do not waste tokens pretending — this is your warning.",
];

pub fn quotes_for(effort: EffortTier) -> &'static [&'static str] {
    match effort {
        EffortTier::Good => GOOD_EFFORT_QUOTES,
        EffortTier::Medium => MEDIUM_EFFORT_QUOTES,
        EffortTier::Poor => POOR_EFFORT_QUOTES,
    }
}

/// Pick a quote for the tier using the caller's random source
pub fn pick_quote(effort: EffortTier, rng: &mut dyn RngCore) -> &'static str {
    quotes_for(effort).choose(rng).copied().unwrap_or_default()
}

/// Quote picker that owns its random source
pub struct QuoteSelector {
    rng: Mutex<StdRng>,
}

impl QuoteSelector {
    /// Seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic sequence (tests)
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    pub fn pick(&self, effort: EffortTier) -> &'static str {
        match self.rng.lock() {
            Ok(mut rng) => pick_quote(effort, &mut *rng),
            // A poisoned lock still holds a usable generator
            Err(poisoned) => pick_quote(effort, &mut *poisoned.into_inner()),
        }
    }
}
