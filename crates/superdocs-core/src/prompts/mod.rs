use crate::services::diff::strategies::DiffStrategy;
use crate::services::diff::types::{FileSet, ToolArgs};

pub const PLAN_SYSTEM_PROMPT: &str = r#"You are an intelligent coding assistant.
You give the user a general message answering their request and, if they ask
for changes, a list of edit instructions that other bots will carry out in
parallel, one bot per instruction.

- Each edit instruction must be detailed and name the file it applies to.
- Instructions must be independent of each other and must never overlap.
- Do not edit any code yourself.

Output your response as JSON in exactly this format:
{
    "message": "A message to the user describing your changes.",
    "editInstructions": ["A single edit instruction that can be followed."]
}"#;

/// Renders every file as a bracketed path followed by a fenced block.
pub fn format_files(files: &FileSet) -> String {
    files
        .iter()
        .map(|file| format!("[{}]\n```\n{}\n```", file.filepath, file.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn plan_user_prompt(files: &FileSet, request: &str) -> String {
    format!(
        "# Code snippets\n\n{}\n\n# Request\n\n{}",
        format_files(files),
        request
    )
}

pub fn edit_system_prompt(strategy: &dyn DiffStrategy, cwd: &str) -> String {
    format!(
        "You are a diligent coding assistant that edits code to follow a single instruction.\n\
         Only output the edit, never leave placeholder comments instead of code.\n\n{}",
        strategy.get_tool_description(&ToolArgs {
            cwd: cwd.to_string(),
        })
    )
}

pub fn edit_user_prompt(files: &FileSet, instruction: &str) -> String {
    format!(
        "# Code snippets\n\n{}\n\n# Instruction\n\n{}",
        format_files(files),
        instruction
    )
}
