//! Prompt assembly for the verdict model.
//!
//! The prompt is a single user message. Its response format section is what
//! `VerdictSummary::parse` reads back.

use chrono::NaiveDate;

use claimcheck_core::{format_long_date, Classification, EvidenceContext};

const CONFIDENCE_INSTRUCTIONS: &str = "\
2. **Confidence Level** - Provide 0-100% based on:
   • Quality and reliability of available evidence (Knowledge Base sources are most authoritative)
   • Consistency across sources
   • Recency of information relative to today's date ({date})
   • Your certainty in the assessment";

const REASONING_INSTRUCTIONS: &str = "\
3. **Detailed Reasoning** - Explain (aim for 150 words):
   • What evidence supports or contradicts the claim
   • Source reliability (prioritize Knowledge Base findings when available)
   • Important context, including temporal relevance
   • Why you chose this confidence level";

/// Fixed response layout the model must follow.
pub const RESPONSE_FORMAT: &str = "\
**RESPONSE FORMAT:**
**Classification:** [Your classification]

**Confidence Percentage:** [X]%

**Reasoning:**
[Your detailed analysis, citing specific evidence and explaining your reasoning process]";

fn classification_menu() -> String {
    Classification::ALL
        .iter()
        .map(|c| format!("   • \"{}\" - {}", c.label(), c.guidance()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the fact-check prompt for an English claim.
pub fn verdict_prompt(claim: &str, evidence: &EvidenceContext, today: NaiveDate) -> String {
    let date = format_long_date(today);

    format!(
        "You are a professional fact-checker analyzing the following claim. Today's date is {date}.\n\
         **CLAIM TO ANALYZE:**\n\
         \"{claim}\"\n\
         \n\
         {note}\n\
         \n\
         **AVAILABLE EVIDENCE:**\n\
         {evidence}\n\
         \n\
         **ANALYSIS INSTRUCTIONS:**\n\
         1. **Classification** - Choose ONE:\n\
         {menu}\n\
         \n\
         {confidence}\n\
         \n\
         {reasoning}\n\
         \n\
         {format}",
        date = date,
        claim = claim,
        note = evidence.authority_note(),
        evidence = evidence.text,
        menu = classification_menu(),
        confidence = CONFIDENCE_INSTRUCTIONS.replace("{date}", &date),
        reasoning = REASONING_INSTRUCTIONS,
        format = RESPONSE_FORMAT,
    )
}
