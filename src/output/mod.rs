/// Plain-text schema linearization for chat prompts.
pub mod context;
/// Writes the JSON model, chat context and report to disk.
pub mod formatter;
/// Builds a Markdown schema report with warnings and policy coverage.
pub mod report;
