//! Chart delegate.
//!
//! The one place in the system that crosses a process boundary: aggregated
//! category/value pairs are handed to an external renderer (JSON on stdin,
//! base64 PNG on stdout), bounded by a hard timeout. The decoded image is
//! persisted under a generated id and served back as a URL.
//!
//! Each failure mode gets its own content block: timeout, non-zero exit,
//! undecodable payload.

use crate::protocol::{ToolContent, ToolResponse};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use orders_core::ChartConfig;
use serde_json::{json, Value};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use uuid::Uuid;

/// Chart kind selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

impl ChartKind {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "bar" => Ok(ChartKind::Bar),
            "pie" => Ok(ChartKind::Pie),
            "line" => Ok(ChartKind::Line),
            other => Err(format!(
                "invalid chart_type: {other:?} (expected bar, pie or line)"
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Line => "line",
        }
    }
}

enum ChartError {
    Timeout(u64),
    Failed { code: i32, stderr: String },
    BadPayload(String),
    Io(std::io::Error),
}

/// Hands pre-aggregated data to the external renderer and relays back a
/// file reference.
#[derive(Clone)]
pub struct ChartDelegate {
    config: ChartConfig,
    public_url: String,
}

impl ChartDelegate {
    pub fn new(config: ChartConfig, public_url: impl Into<String>) -> Self {
        Self {
            config,
            public_url: public_url.into(),
        }
    }

    /// Render a chart and persist the image; all outcomes become content
    /// blocks, including delegate failures.
    pub async fn render_and_store(
        &self,
        kind: ChartKind,
        title: &str,
        categories: &[String],
        values: &[f64],
    ) -> ToolResponse {
        if self.config.renderer.is_empty() {
            return ToolResponse::error("chart renderer is not configured");
        }

        let request = json!({
            "chart_type": kind.as_str(),
            "title": title,
            "x_label": "customer",
            "y_label": "total_amount",
            "width": 900,
            "height": 600,
            "categories": categories,
            "values": values,
        });

        let image = match self.render(&request).await {
            Ok(image) => image,
            Err(ChartError::Timeout(secs)) => {
                return ToolResponse::error(format!(
                    "chart renderer timed out after {secs}s"
                ));
            }
            Err(ChartError::Failed { code, stderr }) => {
                return ToolResponse::error(format!(
                    "chart renderer exited with status {code}: {stderr}"
                ));
            }
            Err(ChartError::BadPayload(reason)) => {
                return ToolResponse::error(format!(
                    "chart renderer returned an undecodable payload: {reason}"
                ));
            }
            Err(ChartError::Io(error)) => {
                return ToolResponse::error(format!("failed to run chart renderer: {error}"));
            }
        };

        let file_name = format!("{}.png", Uuid::new_v4());
        let path = Path::new(&self.config.output_dir).join(&file_name);
        if let Err(error) = tokio::fs::create_dir_all(&self.config.output_dir).await {
            return ToolResponse::error(format!("failed to persist chart image: {error}"));
        }
        if let Err(error) = tokio::fs::write(&path, &image).await {
            return ToolResponse::error(format!("failed to persist chart image: {error}"));
        }

        let url = format!(
            "{}/charts/{}",
            self.public_url.trim_end_matches('/'),
            file_name
        );
        tracing::info!(chart = kind.as_str(), path = %path.display(), "chart rendered");

        ToolResponse::blocks(vec![
            ToolContent::text(summarize(title, categories, values)),
            ToolContent::text(format!("chart image: {url}")),
        ])
    }

    async fn render(&self, request: &Value) -> Result<Vec<u8>, ChartError> {
        let mut command = Command::new(&self.config.renderer[0]);
        command
            .args(&self.config.renderer[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(ChartError::Io)?;
        if let Some(mut stdin) = child.stdin.take() {
            let body = serde_json::to_vec(request)
                .map_err(|e| ChartError::Io(std::io::Error::other(e)))?;
            stdin.write_all(&body).await.map_err(ChartError::Io)?;
            // closing stdin signals end of input to the renderer
        }

        let output = timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| ChartError::Timeout(self.config.timeout_secs))?
        .map_err(ChartError::Io)?;

        if !output.status.success() {
            let stderr: String = String::from_utf8_lossy(&output.stderr)
                .trim()
                .chars()
                .take(200)
                .collect();
            return Err(ChartError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        let encoded = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if encoded.is_empty() {
            return Err(ChartError::BadPayload("empty renderer output".to_string()));
        }
        BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| ChartError::BadPayload(e.to_string()))
    }
}

fn summarize(title: &str, categories: &[String], values: &[f64]) -> String {
    let pairs: Vec<String> = categories
        .iter()
        .zip(values)
        .map(|(category, value)| format!("{category} = {value:.2}"))
        .collect();
    format!("{title}: {}", pairs.join(", "))
}
