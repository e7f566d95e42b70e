use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::csvio::RawRecord;
use crate::error::{KeeshaError, Result};
use crate::models::Account;
use crate::settings::ExtractorSettings;
use crate::validate::parse_date;

/// Turns a prompt into model output. One seam so tests never hit the
/// network.
pub trait TextExtractor {
    fn extract(&self, prompt: &str) -> Result<String>;
}

/// Client for any server implementing the OpenAI `/v1/chat/completions`
/// API (OpenAI itself, vLLM, LocalAI, llama-server).
pub struct HttpExtractor {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl HttpExtractor {
    pub fn new(settings: &ExtractorSettings) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl TextExtractor for HttpExtractor {
    fn extract(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.1,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        if !self.api_key.is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = builder
            .send()
            .map_err(|e| KeeshaError::Extraction(format!("request failed: {e}")))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(KeeshaError::Extraction(format!("API error {status}: {body}")));
        }
        let chat: ChatResponse = response
            .json()
            .map_err(|e| KeeshaError::Extraction(format!("bad response body: {e}")))?;
        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| KeeshaError::Extraction("empty response".to_string()))
    }
}

/// Rough token estimate for chunking. Close enough for budget purposes.
pub fn estimate_tokens(text: &str) -> usize {
    text.len() / 4
}

/// Split on line boundaries so no statement row is cut in half. A single
/// oversized line still goes through as its own chunk.
pub fn chunk_text(text: &str, token_budget: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if !current.is_empty() && estimate_tokens(&current) + estimate_tokens(line) > token_budget {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks
}

pub fn build_prompt(chunk: &str, accounts: &[Account]) -> String {
    let account_list = accounts
        .iter()
        .map(|a| format!("- {} ({})", a.name, a.account_type))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Extract financial transactions from the text below.\n\
         Output CSV lines only, no header, no commentary, one transaction per line:\n\
         title,amount,fromAccount,toAccount,date,description\n\
         Rules:\n\
         - amount is a positive number\n\
         - date is YYYY-MM-DD\n\
         - fromAccount and toAccount must be chosen from this list, or \"Unknown\" if unclear:\n\
         {account_list}\n\
         - quote any field containing a comma\n\n\
         Text:\n{chunk}"
    )
}

/// Parse model output leniently. Models drift from the contract, so a
/// header line is skipped, short lines are dropped, amounts are forced
/// positive, blank accounts fall back to "Unknown", and an unparseable
/// date becomes today.
pub fn parse_extracted(output: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    for line in output.lines() {
        let line = line.trim().trim_start_matches("```").trim_end_matches("```").trim();
        if line.is_empty() || line.starts_with("title,") {
            continue;
        }
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(line.as_bytes());
        let Some(Ok(fields)) = rdr.records().next() else {
            continue;
        };
        if fields.len() < 5 {
            continue;
        }
        let get = |i: usize| fields.get(i).unwrap_or("").to_string();

        let amount = match get(1).parse::<f64>() {
            Ok(a) if a.is_finite() && a != 0.0 => a.abs().to_string(),
            _ => continue,
        };
        let or_unknown = |s: String| if s.is_empty() { "Unknown".to_string() } else { s };
        let date = match parse_date(&get(4)) {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => chrono::Local::now().format("%Y-%m-%d").to_string(),
        };

        records.push(RawRecord {
            title: get(0),
            amount,
            from_account: or_unknown(get(2)),
            to_account: or_unknown(get(3)),
            date,
            description: get(5),
            is_important: false,
        });
    }
    records
}

/// Run the whole pipeline: chunk, prompt, call, parse. Chunks that fail
/// are logged and skipped so one bad call never loses the rest of the
/// document.
pub fn run_extraction(
    extractor: &dyn TextExtractor,
    text: &str,
    accounts: &[Account],
    settings: &ExtractorSettings,
) -> Vec<RawRecord> {
    let chunks = chunk_text(text, settings.chunk_tokens);
    let mut records = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 {
            std::thread::sleep(Duration::from_millis(settings.request_delay_ms));
        }
        match extractor.extract(&build_prompt(chunk, accounts)) {
            Ok(output) => records.extend(parse_extracted(&output)),
            Err(e) => log::warn!("extraction chunk {}/{} failed: {e}", i + 1, chunks.len()),
        }
    }
    records
}
