use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::core::{CharacterProfile, Message, Sender, Tier};

/// Builds prompts and talks to a generative-language backend
#[async_trait]
pub trait ChatTransport {
    /// Prompt for the next companion reply. The tier only selects the tone descriptor.
    fn build_prompt(
        &self,
        character: &CharacterProfile,
        history: &[Message],
        tier: Tier,
        user_message: &str,
    ) -> String {
        build_prompt(character, history, tier, user_message)
    }

    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub fn build_prompt(
    character: &CharacterProfile,
    history: &[Message],
    tier: Tier,
    user_message: &str,
) -> String {
    let mut prompt = format!(
        "You are {}, a {}-year-old virtual companion chatting with the user.\n",
        character.name, character.age
    );

    if !character.personality.is_empty() {
        prompt.push_str(&format!("Personality: {}\n", character.personality));
    }
    if !character.interests.is_empty() {
        prompt.push_str(&format!("Interests: {}\n", character.interests));
    }
    if !character.speaking_style.is_empty() {
        prompt.push_str(&format!("Speaking style: {}\n", character.speaking_style));
    }

    prompt.push_str(&format!(
        "Relationship: {} ({}). {}\n",
        tier.label(),
        tier,
        tier.tone()
    ));
    prompt.push_str(
        "Stay in character, answer in the user's language, keep replies short and natural. \
         Never mention that you are an AI.\n",
    );

    if !history.is_empty() {
        prompt.push_str("\nConversation so far:\n");
        for message in history {
            let speaker = match message.sender {
                Sender::User => "User",
                Sender::Companion => character.name.as_str(),
            };
            prompt.push_str(&format!("{}: {}\n", speaker, message.content));
            if let Some(attachment) = &message.attachment {
                prompt.push_str(&format!(
                    "({} attached {}: {})\n",
                    speaker, attachment.kind, attachment.file_name
                ));
            }
        }
    }

    prompt.push_str(&format!("\nUser: {}\n{}:", user_message, character.name));
    prompt
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AIProvider {
    Gemini,
    OpenAI,
    Ollama,
}

impl std::fmt::Display for AIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AIProvider::Gemini => write!(f, "gemini"),
            AIProvider::OpenAI => write!(f, "openai"),
            AIProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for AIProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(AIProvider::Gemini),
            "openai" | "gpt" => Ok(AIProvider::OpenAI),
            "ollama" => Ok(AIProvider::Ollama),
            _ => Err(anyhow!("Unknown AI provider: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIConfig {
    pub provider: AIProvider,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for AIConfig {
    fn default() -> Self {
        AIConfig {
            provider: AIProvider::Gemini,
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            base_url: None,
            max_tokens: Some(1024),
            temperature: Some(0.9),
        }
    }
}

/// HTTP client for the supported chat providers
pub struct ProviderClient {
    config: AIConfig,
    http_client: reqwest::Client,
}

impl ProviderClient {
    pub fn new(config: AIConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(ProviderClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &AIConfig {
        &self.config
    }

    async fn complete_gemini(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow!("Gemini API key required"))?;
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://generativelanguage.googleapis.com");

        let request_body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_tokens
            }
        });

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            base_url, self.config.model
        );
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("Gemini API error: {}", error_text));
        }

        let response_json: serde_json::Value = response.json().await?;
        let content = response_json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow!("Invalid Gemini response format"))?
            .trim()
            .to_string();

        Ok(content)
    }

    async fn complete_openai(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow!("OpenAI API key required"))?;
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com");

        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature
        });

        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("OpenAI API error: {}", error_text));
        }

        let response_json: serde_json::Value = response.json().await?;
        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("Invalid OpenAI response format"))?
            .trim()
            .to_string();

        Ok(content)
    }

    async fn complete_ollama(&self, prompt: &str) -> Result<String> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("http://localhost:11434");

        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false
        });

        let response = self
            .http_client
            .post(format!("{}/api/chat", base_url))
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("Ollama API error: {}", error_text));
        }

        let response_json: serde_json::Value = response.json().await?;
        let content = response_json["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("Invalid Ollama response format"))?
            .trim()
            .to_string();

        Ok(content)
    }
}

#[async_trait]
impl ChatTransport for ProviderClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(provider = %self.config.provider, model = %self.config.model, "requesting completion");
        let reply = match self.config.provider {
            AIProvider::Gemini => self.complete_gemini(prompt).await,
            AIProvider::OpenAI => self.complete_openai(prompt).await,
            AIProvider::Ollama => self.complete_ollama(prompt).await,
        }?;

        if reply.is_empty() {
            return Err(anyhow!("{} returned an empty reply", self.config.provider));
        }
        Ok(reply)
    }
}
