use crate::constants::limits;
use crate::errors::SuggestError;
use crate::utils::suggest::suggest;
use serde_json::Value;

pub fn unknown_action_error(
    surface: &str,
    action: Option<&Value>,
    known_actions: &[&str],
) -> SuggestError {
    let action_value = action
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .unwrap_or_default();
    let suggestions = if action_value.is_empty() {
        Vec::new()
    } else {
        suggest(&action_value, known_actions, limits::DID_YOU_MEAN)
    };
    let shown: Vec<&str> = known_actions
        .iter()
        .take(limits::KNOWN_ACTIONS_SHOWN)
        .copied()
        .collect();
    let suffix = if known_actions.len() > shown.len() {
        ", ..."
    } else {
        ""
    };
    let list_hint = if shown.is_empty() {
        String::new()
    } else {
        format!("Use one of: {}{}.", shown.join(", "), suffix)
    };
    let did_you_mean = if suggestions.is_empty() {
        String::new()
    } else {
        format!("Did you mean: {}?", suggestions.join(", "))
    };
    let hint = [did_you_mean, list_hint]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut err =
        SuggestError::invalid_params(format!("Unknown {} action: {}", surface, action_value));
    if !hint.is_empty() {
        err = err.with_hint(hint);
    }
    if !known_actions.is_empty() {
        err = err.with_details(serde_json::json!({
            "known_actions": known_actions,
            "did_you_mean": suggestions,
        }));
    }
    err
}
