//! Customer preference elicitation, parsing, and query formatting

use buddy_ai::ToolSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tool the model calls once every preference field has been discussed
pub const GET_PREFERENCE_TOOL: &str = "get_preference";

/// System instruction for the preference-gathering model call
pub const PREFERENCE_TEMPLATE: &str = "Your job is to get product preference from a customer about what type of electronic product they want to buy.

You should get the following information from them:

- Product Category: Which type of electronic product are they interested in?
- Brand Preferences: Do they have any preferred brands?
- Budget Range: What is their budget for the purchase?
- Features: Are there specific features they are looking for?

If you are not able to discern this info, ask them to clarify! Do not attempt to wildly guess.
Put None if customer did not give the desired information after asking.
After you are able to discern all the information,
give the customer a summary of the gathered preference and call the get_preference tool.";

/// Schema for the `get_preference` tool.
///
/// All four fields are plain strings on the wire; the model sends the
/// literal `"None"` for anything the customer declined to give.
pub fn get_preference_schema() -> ToolSchema {
    ToolSchema::new(
        GET_PREFERENCE_TOOL,
        "Record the customer's gathered product preference",
        serde_json::json!({
            "type": "object",
            "properties": {
                "product_category": {
                    "type": "string",
                    "description": "Type of electronic product the customer wants"
                },
                "brand": {
                    "type": "string",
                    "description": "Preferred brand, or \"None\""
                },
                "budget": {
                    "type": "string",
                    "description": "Budget for the purchase, or \"None\""
                },
                "features": {
                    "type": "string",
                    "description": "Specific features wanted, or \"None\""
                }
            },
            "required": ["product_category", "brand", "budget", "features"]
        }),
    )
}

/// Structured preference extracted from a `get_preference` tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerPreference {
    pub category: String,
    pub brand: Option<Vec<String>>,
    pub budget: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
}

impl CustomerPreference {
    /// Render the preference as the search query string.
    ///
    /// Fixed field order, multi-valued fields joined with ", ", absent
    /// fields rendered empty. There is no separator between the labeled
    /// segments; the index was built against this exact shape.
    pub fn to_query(&self) -> String {
        format!(
            "Product Brand: {}Product Category: {} \nFeatures: {}Final Price: {}",
            join(&self.brand),
            self.category,
            join(&self.features),
            join(&self.budget),
        )
    }
}

fn join(field: &Option<Vec<String>>) -> String {
    field.as_deref().map(|v| v.join(", ")).unwrap_or_default()
}

/// Parse `get_preference` tool-call arguments.
///
/// `product_category` is required; the other fields each normalize their
/// own `"None"` sentinel to an absent value.
pub fn parse_customer_preference(args: &serde_json::Value) -> Result<CustomerPreference> {
    let category = args
        .get("product_category")
        .and_then(|v| v.as_str())
        .ok_or(Error::MalformedToolCall {
            tool: GET_PREFERENCE_TOOL,
            missing: "product_category",
        })?
        .to_string();

    Ok(CustomerPreference {
        category,
        brand: optional_field(args, "brand"),
        budget: optional_field(args, "budget"),
        features: optional_field(args, "features"),
    })
}

/// Normalize a possibly-"None" scalar argument into an optional list
fn optional_field(args: &serde_json::Value, key: &str) -> Option<Vec<String>> {
    match args.get(key).and_then(|v| v.as_str()) {
        Some("None") | None => None,
        Some(value) => Some(vec![value.to_string()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn laptop_preference() -> CustomerPreference {
        CustomerPreference {
            category: "laptop".to_string(),
            brand: Some(vec!["Dell".to_string()]),
            budget: Some(vec!["$1000".to_string()]),
            features: None,
        }
    }

    #[test]
    fn test_to_query_exact_format() {
        assert_eq!(
            laptop_preference().to_query(),
            "Product Brand: DellProduct Category: laptop \nFeatures: Final Price: $1000"
        );
    }

    #[test]
    fn test_to_query_is_deterministic() {
        let preference = laptop_preference();
        assert_eq!(preference.to_query(), preference.to_query());
    }

    #[test]
    fn test_to_query_joins_multiple_values() {
        let preference = CustomerPreference {
            category: "laptop".to_string(),
            brand: Some(vec!["Dell".to_string(), "HP".to_string()]),
            budget: None,
            features: Some(vec!["16GB RAM".to_string(), "OLED".to_string()]),
        };
        assert_eq!(
            preference.to_query(),
            "Product Brand: Dell, HPProduct Category: laptop \nFeatures: 16GB RAM, OLEDFinal Price: "
        );
    }

    #[test]
    fn test_parse_full_arguments() {
        let args = json!({
            "product_category": "laptop",
            "brand": "Dell",
            "budget": "$1000",
            "features": "None"
        });

        let preference = parse_customer_preference(&args).unwrap();
        assert_eq!(preference.category, "laptop");
        assert_eq!(preference.brand, Some(vec!["Dell".to_string()]));
        assert_eq!(preference.budget, Some(vec!["$1000".to_string()]));
        assert_eq!(preference.features, None);
    }

    #[test]
    fn test_parse_normalizes_each_field_independently() {
        // "None" in one field must not blank the others
        let args = json!({
            "product_category": "headphones",
            "brand": "None",
            "budget": "$200",
            "features": "noise cancelling"
        });

        let preference = parse_customer_preference(&args).unwrap();
        assert_eq!(preference.brand, None);
        assert_eq!(preference.budget, Some(vec!["$200".to_string()]));
        assert_eq!(
            preference.features,
            Some(vec!["noise cancelling".to_string()])
        );
    }

    #[test]
    fn test_parse_missing_category_is_malformed() {
        let args = json!({"brand": "Dell", "budget": "$1000", "features": "None"});
        match parse_customer_preference(&args) {
            Err(Error::MalformedToolCall { tool, missing }) => {
                assert_eq!(tool, GET_PREFERENCE_TOOL);
                assert_eq!(missing, "product_category");
            }
            other => panic!("expected MalformedToolCall, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_non_string_category_is_malformed() {
        let args = json!({"product_category": 42});
        assert!(matches!(
            parse_customer_preference(&args),
            Err(Error::MalformedToolCall { .. })
        ));
    }
}
