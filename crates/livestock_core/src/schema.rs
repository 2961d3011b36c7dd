//! crates/livestock_core/src/schema.rs
//!
//! Parses and validates model output against the report and valuation shapes.
//! Nothing leaves this module unless every required field is present and in range.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{ReportData, Valuation};

const REPORT_SECTIONS: [&str; 3] = [
    "advanced_breed_detector",
    "ai_veterinary_assistant",
    "hyper_local_advisor",
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("response is not valid JSON: {0}")]
    NotJson(String),
    #[error("response is missing required section '{0}'")]
    MissingSection(&'static str),
    #[error("response does not match the expected shape: {0}")]
    Shape(String),
    #[error("field '{field}' is invalid: {reason}")]
    Field { field: &'static str, reason: String },
}

fn field(field: &'static str, reason: impl Into<String>) -> SchemaViolation {
    SchemaViolation::Field {
        field,
        reason: reason.into(),
    }
}

/// Drops a surrounding markdown code fence, which some models add despite JSON mode.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.strip_prefix("json").unwrap_or(rest);
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn parse_object(raw: &str) -> Result<Value, SchemaViolation> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| SchemaViolation::NotJson(e.to_string()))?;
    if !value.is_object() {
        return Err(SchemaViolation::Shape("expected a JSON object".to_string()));
    }
    Ok(value)
}

fn into_typed<T: DeserializeOwned>(value: Value) -> Result<T, SchemaViolation> {
    serde_json::from_value(value).map_err(|e| SchemaViolation::Shape(e.to_string()))
}

fn require_text(name: &'static str, value: &str) -> Result<(), SchemaViolation> {
    if value.trim().is_empty() {
        Err(field(name, "must not be empty"))
    } else {
        Ok(())
    }
}

fn require_unit_interval(name: &'static str, value: f64) -> Result<(), SchemaViolation> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(field(name, format!("{} is outside [0, 1]", value)))
    }
}

/// Parses raw model output into a validated report.
pub fn parse_report(raw: &str) -> Result<ReportData, SchemaViolation> {
    let value = parse_object(raw)?;
    for section in REPORT_SECTIONS {
        if value.get(section).map_or(true, Value::is_null) {
            return Err(SchemaViolation::MissingSection(section));
        }
    }
    let report: ReportData = into_typed(value)?;
    report.validate()?;
    Ok(report)
}

/// Parses raw model output into a validated valuation.
pub fn parse_valuation(raw: &str) -> Result<Valuation, SchemaViolation> {
    let valuation: Valuation = into_typed(parse_object(raw)?)?;
    valuation.validate()?;
    Ok(valuation)
}

impl ReportData {
    pub fn validate(&self) -> Result<(), SchemaViolation> {
        let breed = &self.advanced_breed_detector;
        require_text("advanced_breed_detector.primary_breed", &breed.primary_breed)?;
        require_unit_interval("advanced_breed_detector.confidence_score", breed.confidence_score)?;
        if !(3..=5).contains(&breed.key_identifiers.len()) {
            return Err(field(
                "advanced_breed_detector.key_identifiers",
                format!("expected 3 to 5 entries, got {}", breed.key_identifiers.len()),
            ));
        }
        for secondary in &breed.secondary_breeds {
            require_text("advanced_breed_detector.secondary_breeds.breed", &secondary.breed)?;
            require_unit_interval(
                "advanced_breed_detector.secondary_breeds.confidence_score",
                secondary.confidence_score,
            )?;
        }

        let health = &self.ai_veterinary_assistant;
        if health.detailed_observations.is_empty() {
            return Err(field(
                "ai_veterinary_assistant.detailed_observations",
                "must contain at least one observation",
            ));
        }
        require_text(
            "ai_veterinary_assistant.veterinary_recommendation",
            &health.veterinary_recommendation,
        )?;

        let advice = &self.hyper_local_advisor;
        require_text("hyper_local_advisor.feeding_tip", &advice.feeding_tip)?;
        require_text("hyper_local_advisor.housing_tip", &advice.housing_tip)?;
        require_text("hyper_local_advisor.seasonal_tip", &advice.seasonal_tip)?;
        Ok(())
    }
}

impl Valuation {
    pub fn validate(&self) -> Result<(), SchemaViolation> {
        require_text("estimated_market_value_inr", &self.estimated_market_value_inr)?;
        if !(3..=4).contains(&self.valuation_factors.len()) {
            return Err(field(
                "valuation_factors",
                format!("expected 3 to 4 entries, got {}", self.valuation_factors.len()),
            ));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::report_json;
    use super::*;
    use crate::domain::{HealthStatus, ObservationStatus};

    #[test]
    fn parses_a_complete_report() {
        let report = parse_report(&report_json("Gir").to_string()).unwrap();
        assert_eq!(report.advanced_breed_detector.primary_breed, "Gir");
        assert_eq!(report.ai_veterinary_assistant.overall_health_status, HealthStatus::Good);
        assert_eq!(
            report.ai_veterinary_assistant.detailed_observations[0].status,
            ObservationStatus::Positive
        );
    }

    #[test]
    fn accepts_fenced_json_and_missing_secondary_breeds() {
        let mut value = report_json("Sahiwal");
        value["advanced_breed_detector"]
            .as_object_mut()
            .unwrap()
            .remove("secondary_breeds");
        let fenced = format!("```json\n{}\n```", value);
        let report = parse_report(&fenced).unwrap();
        assert!(report.advanced_breed_detector.secondary_breeds.is_empty());
    }

    #[test]
    fn missing_veterinary_section_is_reported_by_name() {
        let mut value = report_json("Gir");
        value.as_object_mut().unwrap().remove("ai_veterinary_assistant");
        assert_eq!(
            parse_report(&value.to_string()),
            Err(SchemaViolation::MissingSection("ai_veterinary_assistant"))
        );
    }

    #[test]
    fn rejects_out_of_range_and_enum_violations() {
        let mut value = report_json("Gir");
        value["advanced_breed_detector"]["confidence_score"] = 1.4.into();
        assert!(matches!(parse_report(&value.to_string()), Err(SchemaViolation::Field { .. })));

        let mut value = report_json("Gir");
        value["ai_veterinary_assistant"]["overall_health_status"] = "Excellent".into();
        assert!(matches!(parse_report(&value.to_string()), Err(SchemaViolation::Shape(_))));

        let mut value = report_json("Gir");
        value["advanced_breed_detector"]["key_identifiers"] = serde_json::json!(["one"]);
        assert!(matches!(parse_report(&value.to_string()), Err(SchemaViolation::Field { .. })));

        let mut value = report_json("   ");
        value["advanced_breed_detector"]["breed_origin"] = "x".into();
        assert!(matches!(parse_report(&value.to_string()), Err(SchemaViolation::Field { .. })));
    }

    #[test]
    fn rejects_non_json_and_non_objects() {
        assert!(matches!(parse_report("Sorry, I cannot help."), Err(SchemaViolation::NotJson(_))));
        assert!(matches!(parse_report("[1, 2]"), Err(SchemaViolation::Shape(_))));
    }

    #[test]
    fn valuation_requires_three_or_four_factors() {
        let ok = r#"{"estimated_market_value_inr":"₹45,000 - ₹52,000","valuation_factors":["breed","yield","age"]}"#;
        assert_eq!(parse_valuation(ok).unwrap().valuation_factors.len(), 3);

        let too_few = r#"{"estimated_market_value_inr":"₹45,000","valuation_factors":["breed"]}"#;
        assert!(matches!(parse_valuation(too_few), Err(SchemaViolation::Field { .. })));

        let missing = r#"{"valuation_factors":["a","b","c"]}"#;
        assert!(matches!(parse_valuation(missing), Err(SchemaViolation::Shape(_))));
    }
}
