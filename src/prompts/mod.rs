// Prompt templates for each workflow step

/// System prompt for the outline step.
pub const PLAN_PROMPT: &str = "You are an expert writer tasked with writing a high level outline of an essay. \
Write such an outline for the user provided topic. \
Give an outline of the essay along with any relevant notes or instructions for the sections.";

/// System prompt for the draft/revision step. Accumulated research content is
/// appended via [`writer_system`].
const WRITER_PROMPT: &str = "You are an essay assistant tasked with writing excellent 5-paragraph essays. \
Generate the best essay possible for the user's request and the initial outline. \
If the user provides critique, respond with a revised version of your previous attempts. \
Utilize all the information below as needed:";

/// System prompt for the critique step.
pub const REFLECTION_PROMPT: &str = "You are a teacher grading an essay submission. \
Generate critique and recommendations for the user's submission. \
Provide detailed recommendations, including requests for length, depth, style, etc.";

/// System prompt for query generation from the task.
pub const RESEARCH_PLAN_PROMPT: &str = "You are a researcher charged with providing information that \
can be used when writing the following essay. \
Generate a list of search queries that will gather any relevant information. \
Only generate 3 queries max.";

/// System prompt for query generation from the critique.
pub const RESEARCH_CRITIQUE_PROMPT: &str = "You are a researcher charged with providing information that \
can be used when making any requested revisions (as outlined below). \
Generate a list of search queries that will gather any relevant information. \
Only generate 3 queries max.";

/// Output-format instruction appended to both research prompts so the model
/// returns a parseable query list.
pub const QUERIES_FORMAT: &str = "Return ONLY a JSON object of the form \
{\"queries\": [\"...\"]}. Do not wrap it in markdown code fences. No preamble.";

/// Build the writer system prompt with all accumulated research joined in.
pub fn writer_system(content: &[String]) -> String {
    format!("{}\n\n------\n\n{}", WRITER_PROMPT, content.join("\n\n"))
}

/// Build the system prompt for a query-generation call.
pub fn research_system(base: &str) -> String {
    format!("{base}\n\n{QUERIES_FORMAT}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_system_joins_content() {
        let content = vec!["first snippet".to_string(), "second snippet".to_string()];
        let prompt = writer_system(&content);
        assert!(prompt.contains("first snippet\n\nsecond snippet"));
        assert!(prompt.starts_with("You are an essay assistant"));
    }

    #[test]
    fn test_writer_system_empty_content() {
        let prompt = writer_system(&[]);
        assert!(prompt.ends_with("------\n\n"));
    }

    #[test]
    fn test_research_system_appends_format() {
        let prompt = research_system(RESEARCH_PLAN_PROMPT);
        assert!(prompt.contains("Only generate 3 queries max."));
        assert!(prompt.ends_with("No preamble."));
    }
}
