use colored::Colorize;
use log::{debug, error};
use mime::Mime;
use reqwest::{header, Response, StatusCode};
use serde_json::Value;
use std::fmt;
use syntect::parsing::SyntaxReference;
use syntect::{
    easy::HighlightLines,
    highlighting::{Style, ThemeSet},
    parsing::SyntaxSet,
    util::{as_24_bit_terminal_escaped, LinesWithEndings},
};

use crate::error::{Result, UdnsError};

pub const APPLICATION_ZIP: &str = "application/zip";
pub const TASK_ID_HEADER: &str = "X-Task-Id";
/// Field injected into 202 bodies so the queued task can be looked up later.
pub const TASK_ID_FIELD: &str = "task_id";

/// How JSON bodies are handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Structured,
    /// Indented text for display. Callers that need the data must re-parse it.
    Pretty,
}

impl OutputFormat {
    pub fn toggled(self) -> Self {
        match self {
            OutputFormat::Structured => OutputFormat::Pretty,
            OutputFormat::Pretty => OutputFormat::Structured,
        }
    }
}

/// Every shape a successful call can come back in.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// 204 No Content.
    Empty,
    /// Zip archive, e.g. a multi-zone export.
    Bytes(Vec<u8>),
    /// Plain text, e.g. a single zone file export.
    Text(String),
    /// 202 Accepted. `body` already contains the injected `task_id` field.
    JsonWithTask { body: Value, task_id: String },
    Json(Value),
    FormattedText(String),
}

impl ApiResponse {
    pub fn is_empty(&self) -> bool {
        matches!(self, ApiResponse::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiResponse::Json(value) | ApiResponse::JsonWithTask { body: value, .. } => {
                Some(value)
            }
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            ApiResponse::Json(value) | ApiResponse::JsonWithTask { body: value, .. } => {
                Some(value)
            }
            _ => None,
        }
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            ApiResponse::JsonWithTask { task_id, .. } => Some(task_id),
            _ => None,
        }
    }
}

impl fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiResponse::Empty => write!(f, "{{}}"),
            ApiResponse::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            ApiResponse::Text(text) | ApiResponse::FormattedText(text) => write!(f, "{}", text),
            ApiResponse::Json(value) | ApiResponse::JsonWithTask { body: value, .. } => {
                write!(f, "{}", value)
            }
        }
    }
}

/// Which branch of interpretation a response falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    NoContent,
    Archive,
    PlainText,
    Accepted,
    /// 401 on an attempt that is still allowed to refresh and replay.
    Unauthorized,
    Failed,
    Json,
}

/// Decides how to read a response. Order matters: the API reports some
/// successes only through the content type, so those are checked before the
/// status is treated as an error.
pub fn classify(status: StatusCode, content_type: Option<&Mime>, may_retry: bool) -> ResponseKind {
    if status == StatusCode::NO_CONTENT {
        return ResponseKind::NoContent;
    }

    if let Some(m) = content_type {
        if m.essence_str() == APPLICATION_ZIP {
            return ResponseKind::Archive;
        }
        if m.essence_str() == mime::TEXT_PLAIN.essence_str() {
            return ResponseKind::PlainText;
        }
    }

    if status == StatusCode::ACCEPTED {
        return ResponseKind::Accepted;
    }

    if status == StatusCode::UNAUTHORIZED && may_retry {
        return ResponseKind::Unauthorized;
    }

    if !status.is_success() {
        return ResponseKind::Failed;
    }

    ResponseKind::Json
}

pub fn get_content_type(resp: &Response) -> Option<Mime> {
    resp.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

pub fn get_task_id(resp: &Response) -> Option<String> {
    resp.headers()
        .get(TASK_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Turns a classified response into the caller-facing value.
///
/// `Unauthorized` never reaches this point; the dispatcher handles it.
pub async fn interpret(
    resp: Response,
    kind: ResponseKind,
    format: OutputFormat,
    debug: bool,
) -> Result<ApiResponse> {
    match kind {
        ResponseKind::NoContent => Ok(ApiResponse::Empty),
        ResponseKind::Archive => Ok(ApiResponse::Bytes(resp.bytes().await?.to_vec())),
        ResponseKind::PlainText => Ok(ApiResponse::Text(resp.text().await?)),
        ResponseKind::Accepted => {
            let task_id = get_task_id(&resp).ok_or(UdnsError::MissingTaskId)?;
            let body = resp.text().await?;
            accepted(&body, task_id)
        }
        ResponseKind::Unauthorized | ResponseKind::Failed => {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_else(|e| {
                debug!("Could not read error body: {}", e);
                String::new()
            });
            if debug && !body.is_empty() {
                error!("{} {}", status, body);
            }
            Err(UdnsError::RequestFailed { status, body })
        }
        ResponseKind::Json => {
            let body = resp.text().await?;
            json_body(&body, format)
        }
    }
}

/// Injects the task id into a 202 body. An empty body counts as `{}`.
pub fn accepted(body: &str, task_id: String) -> Result<ApiResponse> {
    let mut value: Value = if body.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(body)?
    };

    match value.as_object_mut() {
        Some(map) => {
            map.insert(TASK_ID_FIELD.to_string(), Value::String(task_id.clone()));
        }
        None => return Err(UdnsError::UnexpectedBody(body.to_string())),
    }

    Ok(ApiResponse::JsonWithTask {
        body: value,
        task_id,
    })
}

/// A successful body with nothing in it is reported as [`ApiResponse::Empty`].
pub fn json_body(body: &str, format: OutputFormat) -> Result<ApiResponse> {
    if body.trim().is_empty() {
        return Ok(ApiResponse::Empty);
    }

    let value: Value = serde_json::from_str(body)?;
    match format {
        OutputFormat::Structured => Ok(ApiResponse::Json(value)),
        OutputFormat::Pretty => Ok(ApiResponse::FormattedText(format_json(&value)?)),
    }
}

pub fn format_json(value: &Value) -> Result<String> {
    jsonxf::pretty_print(&value.to_string()).map_err(UdnsError::Format)
}

// ============================================================================
// Terminal output
// ============================================================================

pub fn print_response(label: &str, resp: &ApiResponse) -> anyhow::Result<()> {
    println!("{}", label.green().bold());
    match resp {
        ApiResponse::Empty => println!("{}", "(no content)".dimmed()),
        ApiResponse::Bytes(bytes) => {
            println!("{}", format!("<{} bytes of zip data>", bytes.len()).yellow())
        }
        ApiResponse::Text(text) => println!("{}", text),
        ApiResponse::FormattedText(text) => print_syntect(text, "json")?,
        ApiResponse::Json(value) | ApiResponse::JsonWithTask { body: value, .. } => {
            print_syntect(&format_json(value)?, "json")?
        }
    }
    if let Some(task_id) = resp.task_id() {
        println!("{} {}", "task:".cyan(), task_id);
    }
    println!();
    Ok(())
}

pub fn print_syntect(s: &str, ext: &str) -> anyhow::Result<()> {
    let ps = SyntaxSet::load_defaults_newlines();
    let ts = ThemeSet::load_defaults();

    let syntax: &SyntaxReference = ps
        .find_syntax_by_extension(ext)
        .unwrap_or_else(|| ps.find_syntax_plain_text()); // fallback if not found

    let mut h = HighlightLines::new(syntax, &ts.themes["base16-ocean.dark"]);

    for line in LinesWithEndings::from(s) {
        let ranges: Vec<(Style, &str)> = h.highlight_line(line, &ps)?;
        let escaped = as_24_bit_terminal_escaped(&ranges[..], true);
        print!("{}", escaped);
    }
    println!("\x1b[0m");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
