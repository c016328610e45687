//! Prompt Assembly
//!
//! Builders that turn typed contexts into prompt strings. All domain copy
//! lives here so the engines and orchestrator stay testable independently of
//! wording. The builders select instruction modes from the field policy
//! rather than branching inside business logic.

use picos_core::{FieldPolicy, ImprovementStyle, Record, RewriteVariation};

/// System prompt shared by the field-suggestion calls.
pub fn system_prompt() -> &'static str {
    "You are an AI agent with knowledge of how a beverage company relays promotion \
execution strategy to front-line sales. The execution enablement group tracks \
promotions as PicOS (Picture of Success) records; each PicOS activity relates to a \
specific store, its doors, and specific products and displays.

What makes a good activity:
- Execution Details must clearly describe the 5 Ps: Product, Package, Point of Sale, \
Price and Placement.
- Naming conventions track strategic initiatives: MSC (Market Street Challenge), \
Big Bets (BBIC immediate consumption, BBW water, BBE energy, BBIso isotonics, BBFC \
future consumption), and pillar programs (BG Big Game, MM March Madness, Sum Summer, \
KOC Coke Creations, FF Fall Football, Hol Holiday).
- \"Execute\" activities are Headquarter Mandated (HQM); \"Sell\" activities are \
Local Sell In (LSI) and require a selling conversation with the store manager."
}

/// System prompt for the rewrite calls.
pub fn rewrite_system_prompt() -> &'static str {
    "You are an AI agent responsible for rewriting and enhancing PicOS Execution \
Details for a beverage company. You MUST:
- Apply layman's language over jargon.
- Never duplicate product descriptions.
- Format using basic HTML (bold, underline, color).
- Include only the most relevant product and promotion info.
- Always respond with JSON.
- ALWAYS attempt to rewrite the Execution Details; the user can discard your \
suggestion if they want."
}

/// Typed context for one field-suggestion prompt.
pub struct SuggestionPromptContext<'a> {
    pub field_key: &'a str,
    /// The current value, only when it is non-blank.
    pub current_value: Option<&'a str>,
    pub policy: &'a FieldPolicy,
    pub execution_text: &'a str,
    pub record_context: &'a str,
}

impl SuggestionPromptContext<'_> {
    /// Literal mode only applies when there is a value to contradict.
    fn literal_mode(&self) -> bool {
        self.current_value.is_some() && self.policy.improvement_style == ImprovementStyle::Literal
    }
}

/// Build the user prompt for one field suggestion.
pub fn suggestion_prompt(ctx: &SuggestionPromptContext<'_>) -> String {
    let mut prompt = String::new();

    let task = if ctx.literal_mode() {
        "detect LITERAL contradictions for"
    } else {
        "suggest an improved value for"
    };
    prompt.push_str(&format!(
        "You are a beverage-company analyst assistant. Analyze the following Execution \
Details to {} the \"{}\" field.\n\n",
        task, ctx.field_key
    ));

    prompt.push_str(&format!("Execution Details:\n{}\n\n", ctx.execution_text));
    prompt.push_str(&format!("Full activity record:\n{}\n\n", ctx.record_context));

    match ctx.current_value {
        Some(value) => prompt.push_str(&format!("Current field value: \"{}\"\n\n", value)),
        None => prompt.push_str(&format!(
            "The \"{}\" field is currently empty.\n\n",
            ctx.field_key
        )),
    }

    match &ctx.policy.options {
        Some(options) => prompt.push_str(&format!(
            "The {} field enforces the following options: {}.\nOnly suggest one of the \
available options. In your reasoning, take into account that the value MUST be one \
of these options.\n\n",
            ctx.field_key,
            options.join(", ")
        )),
        None => prompt.push_str(&format!(
            "The {} field does not enforce a list of options.\n\n",
            ctx.field_key
        )),
    }

    if ctx.literal_mode() {
        prompt.push_str(
            "IMPORTANT: treat the EXECUTION DETAILS as the source of truth. Only flag a \
discrepancy if the execution details contain specific information that contradicts \
the current field value; when there is a conflict, the field should be updated to \
match the execution details.

NOT discrepancies:
- Different levels of detail (e.g., \"Front of store/Lobby\" vs \"Front of store\")
- More or less verbose wording of the same value
- Execution details that simply do not mention conflicting information
- An empty field where the execution details provide info (that is missing data, \
not a discrepancy)

Only suggest updating the field if the execution details explicitly contradict it \
with specific information, and always suggest the value from the execution details \
as the correct one.\n\n",
        );
    } else {
        prompt.push_str(
            "For this field, instead of being literal in your comparison, analyze the \
execution details to suggest an improved value. If the current value is already \
satisfactory and is not empty, do not provide any suggestion and set \
\"hasSuggestion\": false.\n\n",
        );
    }

    if !ctx.policy.guidance.is_empty() {
        prompt.push_str(ctx.policy.guidance.trim());
        prompt.push_str("\n\n");
    }

    prompt.push_str(
        "Respond with JSON in this exact format:
{
  \"hasSuggestion\": boolean,
  \"suggestedValue\": \"string value or null\",
  \"confidence\": number (0-100),
  \"reasoning\": \"brief explanation of why you're suggesting this value or correction\",
  \"isDiscrepancy\": boolean (true ONLY if there's a direct contradiction, false otherwise)
}

",
    );

    if ctx.literal_mode() {
        prompt.push_str(
            "Be very conservative - if in doubt, do not flag as discrepancy. Only flag \
TRUE contradictions.",
        );
    } else {
        prompt.push_str(
            "Only provide a suggestedValue if your confidence is above 60 and the \
suggestion is clearly better given info specifically mentioned in the execution \
details.",
        );
    }

    prompt
}

/// Extra directive appended for an alternative rewrite pass.
pub fn variation_directive(variation: RewriteVariation) -> &'static str {
    match variation {
        RewriteVariation::Concise => {
            "Produce a CONCISE variant: trim every non-essential word while keeping all \
5 Ps and the price point intact."
        }
        RewriteVariation::Detailed => {
            "Produce a DETAILED variant: spell out placement and activation context more \
explicitly, still within the character budget."
        }
    }
}

/// Build the user prompt for one execution-details rewrite pass.
pub fn rewrite_prompt(
    record: &Record,
    variation: Option<RewriteVariation>,
    char_budget: usize,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "Please rewrite the provided Execution Details using the best practices for \
PicOS execution direction.\n\n",
    );
    prompt.push_str(&format!(
        "Here is the activity record:\n{}\n\n",
        record.context_lines()
    ));
    prompt.push_str(&format!(
        "Here are the original Execution Details:\n\"{}\"\n\n",
        record.execution_text()
    ));
    prompt.push_str(&format!(
        "Here is the Activity Type:\n\"{}\"\n\n",
        record.activity_type()
    ));

    prompt.push_str(
        "Tips for improving existing Execution Details:
- If the original author included words or phrases not present anywhere else in the \
record (e.g. Shipper, pallet drop, storage bin), retain them: they capture special \
knowledge.
- Prefer easy-to-understand layman's terminology over acronyms and jargon. For \
example, \"SSD: 12x355ml\" is more confusing than \"12-pack Core CAN display\"; write \
the latter and omit the former.

Normalize any product description to its clearest layman's version, and state it \
exactly ONCE. All of the following are the same concept and must NOT appear \
together: any phrase beginning with \"Product: ...\", \"SSD Core ...\", or \
\"12-pack Core ...\"; any phrase containing \"SSD Import GLS ...\"; any phrase \
ending with \"pack of Cans\". Pick ONE clear phrase and never restate or rephrase \
it in another format.

Activity Type determines how the Execution Details begin:
- \"Execute\" or \"Headquarter Mandated (HQM)\" -> begin with \"Execute:\"
- \"Sell\" or \"Local Sell In (LSI)\" -> begin with \"Sell:\"
- \"HUNT\" or \"Hunt\" -> begin with \"Hunt:\"
- \"VERIFY\" or \"Verify\" -> begin with \"Verify:\"
- Anything else -> do NOT begin with a verb unless it matches the Activity Type \
exactly.

",
    );

    prompt.push_str(&format!(
        "CRITICAL RULES:
- Use only <strong>, <u>, and <span style=\"color:...\"> for formatting.
- Use color for the leading verb, and only when it matches the Activity Type: \
<span style=\"color:red\">Execute</span>, <span style=\"color:gray\">Sell</span>, \
<span style=\"color:goldenrod\">Hunt</span>.
- Only ONE product description is allowed; never repeat it in another format.
- Include the 5 Ps: Product, Package, Point of Sale, Price, and Placement.
- Always include promotion context (e.g., MSC, MM) if available.
- Maximum {} characters, excluding HTML tags. No links or images.

",
        char_budget
    ));

    if let Some(variation) = variation {
        prompt.push_str(variation_directive(variation));
        prompt.push_str("\n\n");
    }

    prompt.push_str(
        "Respond in this JSON format:
{
  \"rewrittenText\": \"<html formatted execution details>\",
  \"improvements\": [\"Short list of improvements made\"],
  \"confidence\": number (0-100)
}",
    );

    prompt
}
