//! Prompts for online drug search and categorization.
//!
//! Replies are expected as a single JSON object; see [`crate::extraction`].

/// System prompt for pediatric drug search.
pub const SEARCH_SYSTEM_PROMPT: &str = r#"You are a pediatric medical assistant. Based on the provided query, return the drug information in JSON format.

Consider the weight and age of the child when determining the appropriate dosage.

Output the information in JSON format, including:
1. Correct generic name (name)
2. Standard total daily dose per kg (dosePerKg) in mg/kg/day - this is required.
3. Max daily dose per kg (maxDailyDosePerKg) - if applicable
4. Frequency of administration (frequency), e.g., "Every 12 hours" or "Twice a day".
5. Drug type (category)
6. Common forms for the drug (form) - e.g., syrup, tablet
7. The strength of the available preparation (strength), e.g., "125mg/5mL" or "400mg"

If a field is not applicable or unknown, omit it from the JSON output, except for dosePerKg which is mandatory."#;

/// Categories the categorizer may answer with.
pub const CATEGORY_LABELS: &[&str] = &["Antibiotic", "Antipyretic", "Respiratory", "GI"];

/// User prompt for a drug search.
pub fn make_search_prompt(query: &str, weight_kg: Option<f64>, age_years: Option<f64>) -> String {
    let mut prompt = format!("Query: {}\n", query.trim());
    if let Some(weight) = weight_kg {
        prompt.push_str(&format!("\nWeight (kg): {}", weight));
    }
    if let Some(age) = age_years {
        prompt.push_str(&format!("\nAge (years): {}", age));
    }
    prompt
}

/// Example replies for few-shot prompting.
pub const FEW_SHOT_EXAMPLES: &[(&str, &str)] = &[
    (
        "crocin",
        r#"{"name":"Paracetamol","dosePerKg":60,"maxDailyDosePerKg":75,"frequency":"Every 6 hours","category":"Antipyretic","form":"syrup","strength":"125mg/5mL"}"#,
    ),
    (
        "azithromycin",
        r#"{"name":"Azithromycin","dosePerKg":10,"frequency":"Once a day","category":"Antibiotic","form":"tablet","strength":"250mg"}"#,
    ),
];

/// Build a complete search prompt with system context and optional examples.
pub fn build_full_prompt(
    query: &str,
    weight_kg: Option<f64>,
    age_years: Option<f64>,
    include_examples: bool,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("<|system|>\n");
    prompt.push_str(SEARCH_SYSTEM_PROMPT);
    prompt.push_str("\n<|end|>\n");

    if include_examples {
        for (input, output) in FEW_SHOT_EXAMPLES {
            prompt.push_str("<|user|>\n");
            prompt.push_str(&make_search_prompt(input, None, None));
            prompt.push_str("\n<|end|>\n");
            prompt.push_str("<|assistant|>\n");
            prompt.push_str(output);
            prompt.push_str("\n<|end|>\n");
        }
    }

    prompt.push_str("<|user|>\n");
    prompt.push_str(&make_search_prompt(query, weight_kg, age_years));
    prompt.push_str("\n<|end|>\n");
    prompt.push_str("<|assistant|>\n");

    prompt
}

/// Prompt asking for a single category label.
pub fn build_categorize_prompt(drug_name: &str) -> String {
    format!(
        "You are a medical expert tasked with categorizing drugs.\n\n\
         Given the drug name, determine its category. The possible categories are: {}.\n\n\
         Drug Name: {}\n\
         Category:",
        CATEGORY_LABELS.join(", "),
        drug_name.trim()
    )
}
