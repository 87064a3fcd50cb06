use clauseguard_core::models::AnalysisOutcome;

use super::AiError;

/// Only the opening of a contract is needed to classify it.
const DETECTION_EXCERPT_CHARS: usize = 2000;

/// Longest label accepted from the classifier.
const MAX_TYPE_LABEL_CHARS: usize = 80;

pub fn detection_prompt(contract_text: &str) -> String {
    let excerpt: String = contract_text.chars().take(DETECTION_EXCERPT_CHARS).collect();
    format!(
        "Analyze the following contract text and determine the type of contract it is.\n\
         Provide only the contract type as a single string (e.g., \"Employment\", \
         \"Non-Disclosure Agreement\", \"Sales\", \"Lease\", etc.).\n\
         Do not include any additional explanation or text.\n\n\
         Contract text:\n{}",
        excerpt
    )
}

pub fn analysis_prompt(contract_text: &str, contract_type: &str) -> String {
    format!(
        r#"Analyze the following {contract_type} contract and provide:
1. A list of risks for the party receiving the contract, each with a brief explanation and severity level (low, medium, high).
2. A list of opportunities or benefits for the party receiving the contract, each with a brief explanation and impact level (low, medium, high).
3. A brief summary of the contract.
4. The key clauses of the contract.
5. Recommendations for improving the contract from the receiving party's perspective.
6. Points worth negotiating.
7. The duration of the contract, if specified.
8. The termination conditions.
9. An assessment of legal compliance.
10. An overall score from 0 to 100, where 100 is the most favorable for the receiving party.

Format your response as JSON with the following structure:
{{
  "risks": [{{"risk": "Risk description", "explanation": "Brief explanation", "severity": "low|medium|high"}}],
  "opportunities": [{{"opportunity": "Opportunity description", "explanation": "Brief explanation", "impact": "low|medium|high"}}],
  "summary": "Brief summary of the contract",
  "keyClauses": ["Clause"],
  "recommendations": ["Recommendation"],
  "negotiationPoints": ["Point"],
  "contractDuration": "Duration",
  "terminationConditions": "Conditions",
  "legalCompliance": "Assessment",
  "overallScore": 0
}}

Important: respond with the JSON object only.

Contract text:
{contract_text}"#
    )
}

/// Clean a classifier reply down to a bare label.
pub fn parse_contract_type(reply: &str) -> Result<String, AiError> {
    let first_line = reply
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or(AiError::Empty)?;

    let is_quote = |c: char| c == '"' || c == '\'' || c == '`' || c == '*';
    let label = first_line
        .trim_end_matches('.')
        .trim_matches(is_quote)
        .trim_end_matches('.')
        .trim();

    if label.is_empty() {
        return Err(AiError::Empty);
    }
    if label.chars().count() > MAX_TYPE_LABEL_CHARS {
        return Err(AiError::Parse(format!(
            "contract type label longer than {} characters",
            MAX_TYPE_LABEL_CHARS
        )));
    }
    Ok(label.to_string())
}

/// Pull the JSON object out of a model reply, tolerating code fences and prose around it.
fn extract_json(text: &str) -> &str {
    let fenced = if text.contains("```json") {
        text.split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
    } else if text.contains("```") {
        text.split("```").nth(1)
    } else {
        None
    };
    let candidate = fenced.unwrap_or(text).trim();

    match (candidate.find('{'), candidate.rfind('}')) {
        (Some(start), Some(end)) if start < end => &candidate[start..=end],
        _ => candidate,
    }
}

pub fn parse_analysis(reply: &str) -> Result<AnalysisOutcome, AiError> {
    if reply.trim().is_empty() {
        return Err(AiError::Empty);
    }
    let json = extract_json(reply);
    serde_json::from_str::<AnalysisOutcome>(json).map_err(|e| AiError::Parse(e.to_string()))
}
