//! Agent card served at `/.well-known/agent.json`.

use serde::{Deserialize, Serialize};

use crate::agent::SUPPORTED_CONTENT_TYPES;

pub const AGENT_NAME: &str = "Math & Search Agent";
pub const SKILL_ID: &str = "math_search_agent";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub version: String,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub capabilities: AgentCapabilities,
    pub skills: Vec<AgentSkill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    pub streaming: bool,
    pub push_notifications: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub examples: Vec<String>,
    #[serde(rename = "inputModes")]
    pub input_modes: Vec<String>,
    #[serde(rename = "outputModes")]
    pub output_modes: Vec<String>,
}

impl AgentCard {
    /// The card for this agent reachable at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        let modes = vec!["text".to_string()];
        let content_types: Vec<String> = SUPPORTED_CONTENT_TYPES.iter().map(|s| s.to_string()).collect();
        Self {
            name: AGENT_NAME.to_string(),
            description: "Searches the web for real-world data and computes answers.".to_string(),
            url: url.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            default_input_modes: modes.clone(),
            default_output_modes: modes,
            capabilities: AgentCapabilities {
                streaming: true,
                push_notifications: false,
            },
            skills: vec![AgentSkill {
                id: SKILL_ID.to_string(),
                name: AGENT_NAME.to_string(),
                description: "Solves real-world math problems by searching for facts and performing calculations."
                    .to_string(),
                tags: vec!["math".into(), "search".into(), "calculation".into()],
                examples: vec![
                    "How many seconds would it take for a leopard at full speed to run through Pont des Arts?".into(),
                    "What is the area of a circle with radius 5 meters?".into(),
                ],
                input_modes: content_types.clone(),
                output_modes: content_types,
            }],
        }
    }
}
