//! Raw oracle responses, exactly as generated.
//!
//! Nothing here is trusted. Every field defaults when missing so a partial
//! response still parses; [`super::validate`] decides what survives.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::OracleResult;

/// Parses a JSON response body into a raw payload.
pub fn parse_payload<T: DeserializeOwned>(body: &str) -> OracleResult<T> {
    Ok(serde_json::from_str(body)?)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEnemy {
    pub name: String,
    pub description: String,
    pub job_class: String,
    #[serde(alias = "attack")]
    pub attack_name: String,
    pub spells: Vec<String>,
    pub element: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBattleCommand {
    pub action_type: String,
    pub target: Option<String>,
    pub skill_name: Option<String>,
    pub spell_name: Option<String>,
    pub item_name: Option<String>,
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTrigger {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    pub trigger: RawTrigger,
    pub trigger_hint: Option<String>,
    pub event_text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSubChapterEvents {
    pub events: Vec<RawEvent>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSummary {
    pub summary: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawScene {
    #[serde(rename = "type")]
    pub kind: String,
    pub speaker: Option<String>,
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCutscene {
    pub scene: Vec<RawScene>,
}

/// Second-level reply: ends the conversation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFinalResponse {
    pub short_text: String,
    pub full_text: String,
    pub final_message: String,
    pub outcome: String,
}

/// First-level reply and the NPC's answer to it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawResponse {
    pub short_text: String,
    pub full_text: String,
    pub npc_reply: String,
    pub follow_up_responses: Vec<RawFinalResponse>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDialogueTree {
    pub initial_message: String,
    pub responses: Vec<RawResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_battle_command_parses() {
        let raw: RawBattleCommand = parse_payload(r#"{"action_type": "spell", "target": "Hero"}"#).unwrap();
        assert_eq!(raw.action_type, "spell");
        assert_eq!(raw.target.as_deref(), Some("Hero"));
        assert!(raw.spell_name.is_none());
    }

    #[test]
    fn enemy_accepts_attack_alias() {
        let raw: RawEnemy = parse_payload(
            r#"{"name": "Bog Wight", "attack": "Grasping Mire", "spells": ["Venom"], "element": "water"}"#,
        )
        .unwrap();
        assert_eq!(raw.attack_name, "Grasping Mire");
        assert_eq!(raw.spells, vec!["Venom".to_string()]);
    }

    #[test]
    fn dialogue_tree_nests_two_levels() {
        let body = r#"{
            "initial_message": "Who goes there?",
            "responses": [{
                "short_text": "A friend",
                "full_text": "We mean no harm.",
                "npc_reply": "Prove it.",
                "follow_up_responses": [
                    {"short_text": "Join us", "full_text": "Travel with us.", "final_message": "Very well.", "outcome": "recruit_success"}
                ]
            }]
        }"#;
        let tree: RawDialogueTree = parse_payload(body).unwrap();
        assert_eq!(tree.responses.len(), 1);
        assert_eq!(tree.responses[0].follow_up_responses[0].outcome, "recruit_success");
    }

    #[test]
    fn malformed_body_is_an_error() {
        let result: OracleResult<RawCutscene> = parse_payload("not json");
        assert!(result.is_err());
    }
}
