//! Prompt preparation.
//!
//! The service generates better SQL for ranking questions when the prompt
//! asks for the sort column alongside the ranked items. `mentions_ordering`
//! detects prompts that already phrase this; the shell uses it to decide
//! whether to show the ranking tip. The submitted text itself is passed
//! through unchanged in every branch.
//
// TODO: once product settles the hint wording, append an explicit
// "also select the column being sorted on" instruction for ordering prompts
// instead of relying on the tip alone.

/// Fixed introspection prompt issued automatically after each upload.
pub const SUMMARY_PROMPT: &str =
    "Provide a brief summary of this data with count of rows, list of columns, and data types";

/// Example prompts the shell offers after an upload.
pub const SAMPLE_PROMPTS: &[&str] = &[
    "Show me the top 5 products by revenue with their revenue values",
    "List customers with the highest total spending and show the spending amount",
    "What are the 3 best performing categories by profit margin and what are their margins?",
    "Find months with sales below average and show their sales figures",
];

const ORDERING_PHRASES: &[&str] = &["based on", "order by", "sort by"];

/// True when the prompt already names an ordering/sorting criterion.
pub fn mentions_ordering(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    ORDERING_PHRASES.iter().any(|p| lower.contains(p))
}

/// Trim the prompt for submission. The text is otherwise unchanged whether
/// or not it mentions ordering.
pub fn prepare_prompt(raw: &str) -> String {
    raw.trim().to_string()
}
