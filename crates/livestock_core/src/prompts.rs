//! crates/livestock_core/src/prompts.rs
//!
//! Builds the instructions sent to the generative model for reports,
//! valuations and assistant chats.

use crate::domain::AnimalAttributes;

const REPORT_SYSTEM_INSTRUCTIONS: &str = r#"You are 'Pashu Sahayak', an advanced AI agricultural expert for the Indian subcontinent. Your purpose is to provide a focused report from a single image of a cow or buffalo. Your report MUST include the following components:
- advanced_breed_detector: Accurately identify the primary cattle or buffalo breed. Provide its geographical origin (breed_origin), a brief history of its formation (breed_formation), and 3 to 5 key physical identifiers (key_identifiers). If you detect signs of cross-breeding, list potential secondary breeds with a confidence score between 0 and 1 (secondary_breeds, may be empty). confidence_score is a number between 0 and 1.
- ai_veterinary_assistant: Assess animal health from the image. overall_health_status is exactly one of "Good", "Fair" or "Needs Attention". detailed_observations is a non-empty list of objects with "area" (e.g. 'Body Condition', 'Coat & Skin', 'Posture & Gait'), "observation" and "status", where status is exactly one of "Positive", "Neutral" or "Concern". veterinary_recommendation is a simple, actionable health tip for the farmer.
- hyper_local_advisor: "language" names the advice language; feeding_tip, housing_tip and seasonal_tip are DETAILED, DESCRIPTIVE and ACTIONABLE paragraphs tailored to the location and written in that language.
DO NOT include market valuation in this report.
Respond with a single valid JSON object with exactly the top-level keys "advanced_breed_detector", "ai_veterinary_assistant" and "hyper_local_advisor", and nothing else."#;

const VALUATION_SYSTEM_INSTRUCTIONS: &str = r#"You are a "Smart Livestock Valuator" AI for the Indian agricultural market. Calculate a fair and realistic market value for cattle and buffaloes from the characteristics and location you are given.
Respond with a single valid JSON object with exactly two keys:
- "estimated_market_value_inr": an estimated price range in INR as a string (e.g. "₹45,000 - ₹52,000").
- "valuation_factors": an array of 3 to 4 short strings explaining the valuation."#;

const ASSISTANT_SYSTEM_INSTRUCTIONS: &str = r#"You are an expert AI assistant for farmers in India named "Pashu Mitra AI". Provide helpful, safe, and practical advice on cattle and buffalo care, focusing on breed information, nutrition, and general well-being. If a user asks about a serious health issue, advise them to consult a qualified local veterinarian immediately. Keep answers concise and easy to understand."#;

/// Used when the assistant receives an image without a message.
pub const DEFAULT_IMAGE_QUESTION: &str = "Describe this image in detail.";

/// System instructions plus the user turn for one model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt {
    pub system: String,
    pub user: String,
}

/// The sentence telling the report model what the vision detector saw.
pub fn breed_hint_clause(breed_hint: Option<&str>) -> String {
    match breed_hint {
        Some(breed) => format!(
            "A secondary breed detector suggests the breed is '{}'. Verify this against the image, and override it with the correct breed if you disagree.",
            breed
        ),
        None => "No secondary breed detection was available for this image; identify the breed from the image alone.".to_string(),
    }
}

pub fn report_prompt(location: &str, language: &str, breed_hint: Option<&str>) -> GenerationPrompt {
    let user = format!(
        "Analyze the provided image and information.\n\
         Location: {location}, India\n\
         Language for Advice: {language}\n\
         CONTEXT: {hint}\n\
         Generate a complete report based on all available information. The hyper_local_advisor tips must be written in {language}. The entire response must be a single JSON object in the required format.",
        location = location.trim(),
        language = language.trim(),
        hint = breed_hint_clause(breed_hint),
    );
    GenerationPrompt {
        system: REPORT_SYSTEM_INSTRUCTIONS.to_string(),
        user,
    }
}

pub fn valuation_prompt(attributes: &AnimalAttributes, language: &str) -> GenerationPrompt {
    let user = format!(
        "Calculate the fair market value for a livestock animal with the following characteristics:\n\
         - Breed: {}\n\
         - Age: {} years\n\
         - Peak Milk Yield: {} liters/day\n\
         - Health Condition: {}\n\
         - Location: {}\n\
         Provide a realistic price range in INR and list the key valuation factors. Write the valuation factors in {}.",
        attributes.breed.trim(),
        attributes.age.trim(),
        attributes.milk_yield.trim(),
        attributes.health.trim(),
        attributes.location.trim(),
        language.trim(),
    );
    GenerationPrompt {
        system: VALUATION_SYSTEM_INSTRUCTIONS.to_string(),
        user,
    }
}

/// Prefixes the user's message with the response-language instruction.
pub fn assistant_prompt(message: Option<&str>, language: &str) -> GenerationPrompt {
    let question = message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_IMAGE_QUESTION);
    GenerationPrompt {
        system: ASSISTANT_SYSTEM_INSTRUCTIONS.to_string(),
        user: format!("Respond in {}.\n\n{}", language.trim(), question),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_clause_names_the_detected_breed() {
        let clause = breed_hint_clause(Some("Gir"));
        assert!(clause.contains("'Gir'"));
        assert!(clause.contains("override"));
    }

    #[test]
    fn hint_clause_states_absence() {
        let clause = breed_hint_clause(None);
        assert!(clause.starts_with("No secondary breed detection was available"));
    }

    #[test]
    fn report_prompt_carries_location_language_and_hint() {
        let prompt = report_prompt(" Anand, Gujarat ", "Hindi", Some("Gir"));
        assert!(prompt.user.contains("Location: Anand, Gujarat, India"));
        assert!(prompt.user.contains("written in Hindi"));
        assert!(prompt.user.contains(&breed_hint_clause(Some("Gir"))));
        assert!(prompt.system.contains("hyper_local_advisor"));
    }

    #[test]
    fn valuation_prompt_lists_every_attribute() {
        let attributes = AnimalAttributes {
            breed: "Murrah".into(),
            age: "4".into(),
            milk_yield: "12".into(),
            health: "Good".into(),
            location: "Karnal, Haryana".into(),
        };
        let prompt = valuation_prompt(&attributes, "English");
        for needle in ["Breed: Murrah", "Age: 4 years", "12 liters/day", "Health Condition: Good", "Karnal, Haryana", "in English"] {
            assert!(prompt.user.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn assistant_prompt_defaults_for_image_only() {
        let prompt = assistant_prompt(Some("   "), "Tamil");
        assert_eq!(prompt.user, format!("Respond in Tamil.\n\n{}", DEFAULT_IMAGE_QUESTION));

        let prompt = assistant_prompt(Some("How much water does a calf need?"), "English");
        assert_eq!(prompt.user, "Respond in English.\n\nHow much water does a calf need?");
    }
}
