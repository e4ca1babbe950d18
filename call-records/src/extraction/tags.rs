use crate::facts::ExtractedFacts;
use crate::models::{CallSource, Intent, Outcome};

fn outcome_tag(outcome: Outcome) -> Option<&'static str> {
    match outcome {
        Outcome::Transferred => Some("transferred"),
        Outcome::Resolved => Some("auto-resolved"),
        Outcome::NotFound => Some("not-found"),
        Outcome::AuthFailed => Some("auth-failed"),
        Outcome::Unknown => None,
    }
}

fn claim_status_tag(status: &str) -> Option<&'static str> {
    match status.to_lowercase().as_str() {
        "denied" => Some("claim-denied"),
        "paid" => Some("claim-paid"),
        "pending" => Some("claim-pending"),
        _ => None,
    }
}

/// Dashboard tags for a call, in a stable order without duplicates
pub fn build_tags(source: CallSource, intent: Intent, outcome: Outcome, facts: &ExtractedFacts) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: &str| {
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    };

    if source == CallSource::Elevenlabs {
        push("elevenlabs");
    }
    push(intent.as_str());
    if let Some(tag) = outcome_tag(outcome) {
        push(tag);
    }

    let claim_status = facts.get_str("claim_status").or_else(|| facts.get_str("status"));
    if let Some(tag) = claim_status.as_deref().and_then(claim_status_tag) {
        push(tag);
    }

    let member_status = facts.get_str("member_status").or_else(|| facts.get_str("status"));
    if member_status
        .map(|status| status.to_lowercase())
        .is_some_and(|status| status == "termed" || status == "inactive")
    {
        push("inactive-member");
    }

    if facts.get_str("service_type").is_some() {
        push("service-check");
        match facts.get_bool_like("service_covered") {
            Some(true) => push("service-covered"),
            Some(false) => push("service-not-covered"),
            None => {}
        }
    }

    tags
}
