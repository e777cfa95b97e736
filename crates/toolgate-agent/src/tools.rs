//! Capability interface for invocable tools, plus the built-in local set.
//!
//! Local closures and remote-discovered tools share one contract so the
//! turn executor is agnostic to tool origin.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde_json::Value;

/// A named, schema-described operation the model may request.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool identifier as exposed to the model.
    fn name(&self) -> &str;
    /// Human-readable description for the tool catalog.
    fn description(&self) -> &str;
    /// JSON schema of the accepted arguments.
    fn schema(&self) -> Value;
    /// Execute with the given arguments; errors are recoverable (they
    /// become error tool-results, not aborted conversations).
    async fn invoke(&self, arguments: Option<Value>) -> Result<String>;
}

/// The statically defined in-process tool set for local calling mode.
#[must_use]
pub fn local_tools() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(CurrentDateTime), Arc::new(RandomFromDateTime)]
}

/// Current UTC date/time in ISO 8601.
struct CurrentDateTime;

#[async_trait]
impl Tool for CurrentDateTime {
    fn name(&self) -> &str {
        "get_current_datetime"
    }

    fn description(&self) -> &str {
        "Returns the current date and time in ISO 8601 format."
    }

    fn schema(&self) -> Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn invoke(&self, _arguments: Option<Value>) -> Result<String> {
        Ok(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
    }
}

/// Pseudo-random number with bounds seeded from a date.
struct RandomFromDateTime;

impl RandomFromDateTime {
    /// Bounds derived from the date's 100ns tick count:
    /// `min = ticks % 100`, `max = min + 1000`.
    fn bounds(datetime: DateTime<Utc>) -> (i64, i64) {
        let ticks = datetime.timestamp_micros() * 10;
        let min = ticks.rem_euclid(100);
        (min, min + 1_000)
    }
}

#[async_trait]
impl Tool for RandomFromDateTime {
    fn name(&self) -> &str {
        "get_random_number_from_datetime"
    }

    fn description(&self) -> &str {
        "Generates a random number based on a date."
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "datetime": {
                    "type": "string",
                    "format": "date-time",
                    "description": "The date to generate random number from"
                }
            }
        })
    }

    async fn invoke(&self, arguments: Option<Value>) -> Result<String> {
        let datetime = match arguments
            .as_ref()
            .and_then(|args| args.get("datetime"))
            .and_then(Value::as_str)
        {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map_err(|e| anyhow::anyhow!("invalid datetime argument {raw:?}: {e}"))?
                .with_timezone(&Utc),
            None => Utc::now(),
        };
        let (min, max) = Self::bounds(datetime);
        let number = rand::thread_rng().gen_range(min..max);
        Ok(number.to_string())
    }
}
