//! Combat flavor text lookup
//!
//! The game layer may plug in its own catalog; [`FallbackCatalog`] provides
//! plain generic lines so combat never goes silent.

/// Point in an attack the message describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Initiate,
    Hit,
    Miss,
    Kill,
}

/// Names substituted into a message
#[derive(Debug, Clone)]
pub struct MessageContext<'a> {
    pub attacker: &'a str,
    pub target: &'a str,
    pub item: &'a str,
    /// Struck body location, if any
    pub hit_location: Option<&'a str>,
}

/// One line for each point of view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatMessage {
    pub attacker: String,
    pub victim: String,
    pub observer: String,
}

pub trait MessageCatalog {
    /// Look up the message for a weapon category key and phase
    fn lookup(&self, weapon: &str, phase: Phase, ctx: &MessageContext<'_>) -> CombatMessage;
}

/// Generic templates built from a per-weapon verb
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackCatalog;

fn verb_for(weapon: &str) -> &'static str {
    match weapon {
        "blade" => "slash",
        "blunt" => "bash",
        "spear" => "stab",
        "firearm" | "bow" => "shoot",
        "unarmed" => "punch",
        _ => "hit",
    }
}

/// Third-person singular of an English verb
pub fn third_person(verb: &str) -> String {
    if verb.ends_with('s') || verb.ends_with("sh") || verb.ends_with("ch") || verb.ends_with('x') || verb.ends_with('z') {
        format!("{verb}es")
    } else if let Some(stem) = verb.strip_suffix('y') {
        if stem.ends_with(|c: char| "aeiou".contains(c)) {
            format!("{verb}s")
        } else {
            format!("{stem}ies")
        }
    } else {
        format!("{verb}s")
    }
}

impl MessageCatalog for FallbackCatalog {
    fn lookup(&self, weapon: &str, phase: Phase, ctx: &MessageContext<'_>) -> CombatMessage {
        let verb = verb_for(weapon);
        let verbs = third_person(verb);
        let (attacker, target, item) = (ctx.attacker, ctx.target, ctx.item);
        let place = ctx
            .hit_location
            .map(|l| format!(" in the {}", l.replace('_', " ")))
            .unwrap_or_default();

        match phase {
            Phase::Initiate => CombatMessage {
                attacker: format!("You turn on {target} with your {item}."),
                victim: format!("{attacker} turns on you with their {item}."),
                observer: format!("{attacker} turns on {target} with their {item}."),
            },
            Phase::Hit => CombatMessage {
                attacker: format!("You {verb} {target}{place} with your {item}."),
                victim: format!("{attacker} {verbs} you{place} with their {item}."),
                observer: format!("{attacker} {verbs} {target}{place} with their {item}."),
            },
            Phase::Miss => CombatMessage {
                attacker: format!("You {verb} at {target} with your {item}, but miss."),
                victim: format!("{attacker} {verbs} at you with their {item}, but misses."),
                observer: format!("{attacker} {verbs} at {target} with their {item}, but misses."),
            },
            Phase::Kill => CombatMessage {
                attacker: format!("You {verb} {target}{place} with your {item}. They go still."),
                victim: format!("{attacker} {verbs} you{place} with their {item}. Everything goes dark."),
                observer: format!("{attacker} {verbs} {target}{place} with their {item}. {target} goes still."),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_third_person() {
        assert_eq!(third_person("slash"), "slashes");
        assert_eq!(third_person("punch"), "punches");
        assert_eq!(third_person("stab"), "stabs");
        assert_eq!(third_person("parry"), "parries");
        assert_eq!(third_person("play"), "plays");
    }

    #[test]
    fn test_fallback_hit_message() {
        let ctx = MessageContext {
            attacker: "Kira",
            target: "Dane",
            item: "knife",
            hit_location: Some("left_arm"),
        };
        let message = FallbackCatalog.lookup("blade", Phase::Hit, &ctx);
        assert_eq!(message.attacker, "You slash Dane in the left arm with your knife.");
        assert_eq!(message.victim, "Kira slashes you in the left arm with their knife.");
        assert_eq!(message.observer, "Kira slashes Dane in the left arm with their knife.");
    }

    #[test]
    fn test_unknown_weapon_uses_generic_verb() {
        let ctx = MessageContext {
            attacker: "Kira",
            target: "Dane",
            item: "chair",
            hit_location: None,
        };
        let message = FallbackCatalog.lookup("furniture", Phase::Miss, &ctx);
        assert_eq!(message.attacker, "You hit at Dane with your chair, but miss.");
    }
}
