//! Built-in prompt variants
//!
//! Each template carries the `{{categories}}` and `{{document}}`
//! substitution points.

/// (id, description, template)
pub const BUILTIN_PROMPTS: [(&str, &str, &str); 4] = [
    ("v1", "Concise instruction, category-keyed JSON", V1),
    ("v2", "Category taxonomy with examples", V2),
    ("v3", "Extraction protocol with character offsets", V3),
    ("v4", "Strict output requirements for legal and compliance text", V4),
];

const V1: &str = r#"You are an expert PII identification tool for legal documents. Your task is to analyze the
provided text and extract all instances of Personally Identifiable Information (PII).

PII Categories to identify:
{{categories}}

Do not generate any conversational text, explanations, or analysis. Return the exact text
of every entity. Do not miss partial matches or embedded entities.
Output must be a single JSON object. The keys must be the PII categories,
and the value must be a list of all detected instances.
If a category is not found, its list should be empty.

Input Text: {{document}}
"#;

const V2: &str = r#"You are an expert PII identification and entity extraction tool for legal documents.
Analyze the provided text and identify ALL instances of the 12 PII/Entity Categories listed below.

### PII/Entity Categories to Extract
{{categories}}

### Output Constraints
- Output MUST be a single JSON object of the form {"entities": [{"text": "...", "category": "..."}]}.
- Do not include any conversational text, explanations, or analysis.
- Ensure all instances, including embedded and partial matches, are captured.
- Use the category names exactly as listed.

### Text
{{document}}
"#;

const V3: &str = r#"ROLE: Precision PII Extraction Engine for Legal Documents

MISSION: Exhaustively identify and locate all Personally Identifiable Information with character-level accuracy.

PII TAXONOMY (12 categories):
{{categories}}

EXTRACTION PROTOCOL:
1. SCAN: Examine every character sequence
2. CLASSIFY: Assign to exact PII category
3. LOCATE: Record precise start/end indices
4. CAPTURE: Preserve exact casing and formatting
5. REPORT: Structured JSON output

ZERO TOLERANCE:
- No missed entities
- No approximate positions
- No category misassignment
- No text normalization
- No explanatory text

OUTPUT SCHEMA (JSON):
{
  "entities": [
    {
      "text": "verbatim text from document",
      "type": "exact_category_name",
      "start_index": integer,
      "end_index": integer
    }
  ]
}

STRICT COMPLIANCE: Return ONLY valid JSON. No preamble. No commentary.

DOCUMENT:
{{document}}
"#;

const V4: &str = r#"You are an advanced PII extraction engine specialized in legal and compliance documents.
Your task is to detect and extract all Personally Identifiable Information (PII) from the
input text.

You must identify the following PII categories:

{{categories}}

Extraction Requirements:
- Return all exact text spans, including partial names, nested entities, or embedded values.
- Provide the character start index and character end index (exclusive) for each detected PII.
- Output must contain only the final JSON object. No explanations or conversational text.
- The JSON must contain all 12 keys. Each key's value must be a list of items.
- Each detected item must be an object with fields: `value`, `type`, `start`, `end`.
- If a category has no matches, return an empty list.
- Do not alter, normalize, or correct the extracted text; return it exactly as it appears.

Input Text: {{document}}
"#;
