//! Fixed instruction template for the generative judge.

const TEMPLATE_HEAD: &str = "Analyze the following news content for fake news indicators. \
Provide a detailed analysis in JSON format.";

const SCHEMA: &str = r#"{
    "verdict": "REAL/FAKE/UNCERTAIN",
    "confidence": 0.85,
    "factual_indicators": {
        "claims_verifiable": true,
        "specific_dates": true,
        "named_sources": true,
        "quotes_attributed": true
    },
    "linguistic_indicators": {
        "emotional_language": 0.3,
        "exaggeration": 0.2,
        "bias_indicators": 0.4,
        "clickbait_elements": 0.1
    },
    "source_indicators": {
        "authority_claims": 0.2,
        "conspiracy_theory_language": 0.1,
        "unverified_claims": 0.3
    },
    "key_factors": [
        "List of key factors influencing the decision"
    ],
    "recommendations": [
        "List of recommendations for verification"
    ]
}"#;

/// Build the judge prompt for a subject.
pub fn build_prompt(text: &str, title: Option<&str>) -> String {
    format!(
        "{head}\n\nTitle: {title}\nContent: {text}\n\n\
         Please analyze and return a JSON response with the following structure:\n{schema}\n",
        head = TEMPLATE_HEAD,
        title = title.unwrap_or("No title provided"),
        text = text,
        schema = SCHEMA,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_subject_and_schema() {
        let prompt = build_prompt("Body text here", Some("Headline"));
        assert!(prompt.contains("Title: Headline"));
        assert!(prompt.contains("Content: Body text here"));
        assert!(prompt.contains("\"conspiracy_theory_language\""));
    }

    #[test]
    fn missing_title_is_named() {
        let prompt = build_prompt("Body text here", None);
        assert!(prompt.contains("Title: No title provided"));
    }

    #[test]
    fn schema_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(SCHEMA).unwrap();
        assert_eq!(value["confidence"], 0.85);
    }
}
