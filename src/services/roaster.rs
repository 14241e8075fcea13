use crate::api::error::AppError;
use crate::services::gemini::{GeminiClient, Part};
use std::sync::Arc;

/// Produces the final roast text from an image description.
#[async_trait::async_trait]
pub trait RoastGenerator: Send + Sync {
    async fn roast(&self, description: &str) -> Result<String, AppError>;
}

pub struct GeminiRoaster {
    client: Arc<GeminiClient>,
    support_link: Option<String>,
}

impl GeminiRoaster {
    pub fn new(client: Arc<GeminiClient>, support_link: Option<String>) -> Self {
        Self {
            client,
            support_link,
        }
    }
}

/// Persona prompt with the description placed first.
pub fn build_roast_prompt(description: &str, support_link: Option<&str>) -> String {
    let mut prompt = format!(
        "{description}\n\n\
Act like the meanest person in the world, the one everybody hates because everything you say is painfully true. \
Write a roast of the image described above. Be very detailed and very critical. \
You may use a few light, safe and completely non-offensive Indonesian swear words or mild slang, \
and you must talk the way young people talk. \
If any recent news or trending topic relates to the description, use it to spice up the roast. \
Write the roast in simple, edgy, casual Indonesian, the way most Indonesians actually speak. \
Sprinkle in some emojis. Give it your best roast. \
Keep the answer under 500 words and format it in markdown."
    );

    if let Some(link) = support_link {
        prompt.push_str(&format!(
            "\n\nAt the end, ask the reader to support the website owner by visiting {link}. \
It does not need to be subtle, just don't make it read like a blatant advertisement."
        ));
    }

    prompt
}

#[async_trait::async_trait]
impl RoastGenerator for GeminiRoaster {
    async fn roast(&self, description: &str) -> Result<String, AppError> {
        let prompt = build_roast_prompt(description, self.support_link.as_deref());
        self.client
            .generate_content(&[Part::text(prompt)])
            .await
            .map_err(AppError::Generation)
    }
}
