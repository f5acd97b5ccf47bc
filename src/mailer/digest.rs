//! Renders the HTML digest body summarizing new mentions for an alert.

use minijinja::Environment;
use serde_json::json;
use thiserror::Error;

use crate::models::{Alert, SentimentCounts};

/// The fixed subject line of every digest email.
pub const DIGEST_SUBJECT: &str = "New mentions for your tracked keywords";

/// The fixed digest template. The surrounding dashboard styles the markup;
/// only the fields matter here.
const DIGEST_TEMPLATE: &str = r#"<html>
  <body>
    <h2>{{ total_mentions }} new mentions of &quot;{{ keywords }}&quot;</h2>
    <ul>
      <li>Positive Mentions: {{ positive }}</li>
      <li>Neutral Mentions: {{ neutral }}</li>
      <li>Negative Mentions: {{ negative }}</li>
    </ul>
    <p>Overall trend: <strong>{{ trend }}</strong></p>
    {% if sources %}<p>Including notable discussions from {{ sources }}.</p>{% endif %}
  </body>
</html>"#;

/// Error type for digest rendering.
#[derive(Debug, Error)]
pub enum DigestError {
    /// The template failed to render.
    #[error("Failed to render digest template: {0}")]
    Render(#[from] minijinja::Error),
}

/// Renders digest bodies from alert data and sentiment counts.
pub struct DigestRenderer {
    env: Environment<'static>,
}

impl Default for DigestRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DigestRenderer {
    /// Creates a renderer with a strict environment so a missing field fails
    /// loudly instead of rendering an empty digest.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        Self { env }
    }

    /// Renders the digest body for one firing.
    pub fn render(&self, alert: &Alert, counts: &SentimentCounts) -> Result<String, DigestError> {
        let sources = alert
            .sources
            .iter()
            .map(|source| display_source(source))
            .collect::<Vec<_>>()
            .join(", ");

        let context = json!({
            "keywords": alert.keywords,
            "total_mentions": counts.total(),
            "positive": counts.positive,
            "neutral": counts.neutral,
            "negative": counts.negative,
            "trend": counts.dominant_trend().to_string(),
            "sources": sources,
        });

        Ok(self.env.render_str(DIGEST_TEMPLATE, context)?)
    }
}

/// Presentation rule only: the platform formerly known as Twitter is shown as
/// "X" in the digest, while the stored filter label stays "Twitter".
fn display_source(source: &str) -> &str {
    if source == "Twitter" {
        "X"
    } else {
        source
    }
}
