//! Classification of state modifiers by their effect on future progression.
//!
//! The classifier is a pure oracle: it never looks at the graph, only at the
//! modifier tokens themselves. Tokens have the shape `$PREFIX` or
//! `$PREFIX[arg,arg]`; anything containing a comparison operator outside the
//! brackets is a comparison against state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Effect of a modifier (or sequence of modifiers) on what can be reached
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModifierEffect {
    /// No effect on reachability reasoning.
    #[default]
    None,
    /// Never reduces what is reachable afterwards.
    Beneficial,
    /// Never increases what is reachable afterwards.
    Detrimental,
    /// May go either way.
    Mixed,
}

impl ModifierEffect {
    /// Combine the effect accumulated so far with the next one in sequence.
    pub fn then(self, next: ModifierEffect) -> ModifierEffect {
        match (self, next) {
            (ModifierEffect::Mixed, _) | (_, ModifierEffect::Mixed) => ModifierEffect::Mixed,
            (ModifierEffect::None, effect) | (effect, ModifierEffect::None) => effect,
            (a, b) if a == b => a,
            _ => ModifierEffect::Mixed,
        }
    }
}

impl fmt::Display for ModifierEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ModifierEffect::None => "none",
            ModifierEffect::Beneficial => "beneficial",
            ModifierEffect::Detrimental => "detrimental",
            ModifierEffect::Mixed => "mixed",
        };
        write!(f, "{}", label)
    }
}

/// Prefixes that restore resources or reset state to a better one.
const BENEFICIAL_PREFIXES: &[&str] = &[
    "BENCHRESET",
    "HOTSPRINGRESET",
    "REGAINSOUL",
    "SAVEQUITRESET",
    "FLOWERGET",
];

/// Prefixes that consume resources or lock in a worse state.
const DETRIMENTAL_PREFIXES: &[&str] = &[
    "TAKEDAMAGE",
    "EQUIPPEDCHARM",
    "SPENDSOUL",
    "SHADESKIP",
    "STAGSTATEMODIFIER",
];

/// Prefixes that both reset and lose state.
const MIXED_PREFIXES: &[&str] = &["WARPTOBENCH", "WARPTOSTART", "STARTRESET"];

/// Prefixes that spend a resource which may be recovered mid-way unless an
/// argument pins the spend before or after a point.
const RESTRICTED_RECOVERY_PREFIXES: &[&str] = &["CASTSPELL", "SLOPEBALL", "SHRIEKPOGO"];

/// Decoded shape of a modifier token.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ModifierShape<'a> {
    Comparison,
    Call { prefix: &'a str, args: Vec<&'a str> },
}

fn parse_shape(token: &str) -> ModifierShape<'_> {
    let token = token.trim();
    let (head, args) = match token.split_once('[') {
        Some((head, rest)) => {
            let inner = rest.strip_suffix(']').unwrap_or(rest);
            let args = inner
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .collect();
            (head, args)
        }
        None => (token, Vec::new()),
    };

    if head.contains(['<', '>', '=']) {
        return ModifierShape::Comparison;
    }

    ModifierShape::Call {
        prefix: head.trim_start_matches('$'),
        args,
    }
}

fn is_recovery_qualifier(arg: &str) -> bool {
    arg.starts_with("before:") || arg.starts_with("after:")
}

/// Classify a single modifier token.
pub fn classify_single(token: &str) -> ModifierEffect {
    let (prefix, args) = match parse_shape(token) {
        ModifierShape::Comparison => return ModifierEffect::Mixed,
        ModifierShape::Call { prefix, args } => (prefix, args),
    };

    // TODO: confirm with logic maintainers whether one before:/after:
    // argument is enough, or whether every argument must be a qualifier
    // (`$SHRIEKPOGO[2,after:X]` would then be Mixed).
    if RESTRICTED_RECOVERY_PREFIXES.contains(&prefix) {
        return if args.iter().any(|a| is_recovery_qualifier(a)) {
            ModifierEffect::Detrimental
        } else {
            ModifierEffect::Mixed
        };
    }

    if BENEFICIAL_PREFIXES.contains(&prefix) {
        ModifierEffect::Beneficial
    } else if DETRIMENTAL_PREFIXES.contains(&prefix) {
        ModifierEffect::Detrimental
    } else if MIXED_PREFIXES.contains(&prefix) {
        ModifierEffect::Mixed
    } else {
        ModifierEffect::None
    }
}

/// Classify an ordered sequence of modifiers.
///
/// Stops at the first Mixed result, since nothing later can undo it.
pub fn classify_many<S: AsRef<str>>(tokens: &[S]) -> ModifierEffect {
    let mut acc = ModifierEffect::None;
    for token in tokens {
        acc = acc.then(classify_single(token.as_ref()));
        if acc == ModifierEffect::Mixed {
            return ModifierEffect::Mixed;
        }
    }
    acc
}
