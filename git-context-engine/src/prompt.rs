//! Prompt builders for pull-request descriptions and issue drafts.
//!
//! Produces the system/user message pair only. Sending it to a model is the
//! caller's business.

use serde::Serialize;

use crate::formatter::DiffContext;
use crate::git_providers::IssueReference;

/// System instructions for PR-description generation.
pub const PR_DESCRIPTION_SYSTEM: &str = "You are a senior software engineer writing pull request descriptions. \
You write clear, concise, and technically accurate descriptions.";

/// System instructions for drafting a tracker issue.
pub const ISSUE_SYSTEM: &str = "You are an expert software developer assistant that helps with creating well-structured Linear issues.\n\
Generate a Linear issue based on the user's request. \n\
Format the issue with a clear title (component prefix followed by a colon), detailed description with problem statement, success criteria, acceptance criteria, and additional notes.\n\
Ensure the issue is descriptive, actionable, and follows best practices for issue tracking.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Builds the PR-description prompt for `issue`.
///
/// The diff block is only attached when `diff_context.used_diff` is set;
/// otherwise the model is asked to infer likely changes from the issue.
///
/// # Example
/// ```
/// # use git_context_engine::git_providers::IssueReference;
/// # use git_context_engine::prompt::build_pr_description_prompt;
/// let issue = IssueReference::new("ABC-42", "Fix login timeout");
/// let prompt = build_pr_description_prompt(&issue, None, None);
/// assert!(prompt.user.contains("### Changes Made:"));
/// ```
pub fn build_pr_description_prompt(
    issue: &IssueReference,
    diff_context: Option<&DiffContext>,
    custom_instructions: Option<&str>,
) -> PromptPair {
    let url = issue.url.as_deref().unwrap_or_default();
    let description = issue.description.as_deref().unwrap_or_default();
    let diff = diff_context.filter(|d| d.used_diff);

    let mut user = String::new();
    user.push_str("Generate a pull request description for the following issue:\n\n");
    user.push_str(&format!("Issue Title: {}\n", issue.title));
    user.push_str(&format!("Issue ID: {}\n", issue.identifier));
    user.push_str(&format!("Issue URL: {url}\n"));
    user.push_str(&format!("Issue Description: {description}\n\n"));

    if let Some(diff) = diff {
        user.push_str("The following code changes were made on the issue branch:\n\n");
        user.push_str(diff.text.trim_end());
        user.push_str("\n\n");
    }

    let changes_hint = if diff.is_some() {
        "[Generate 3-5 specific, clear bullet points summarizing the code changes above]"
    } else {
        "[Generate 3-5 specific, clear bullet points about likely changes based on the issue title]"
    };

    user.push_str("Please follow this exact template:\n\n");
    user.push_str(&format!("### Issue:\n[{}]({url})\n\n", issue.title));
    user.push_str(
        "### Description:\n[Generate a brief, clear description of what the PR is about based on the issue title]\n\n",
    );
    user.push_str(&format!("### Changes Made:\n{changes_hint}\n\n"));
    user.push_str("### Closing Note:\n[Generate a brief conclusion about why this PR is important]\n\n");
    user.push_str(
        "Make the description professional, clear and concise. Focus on technical accuracy and clarity.",
    );

    if let Some(extra) = custom_instructions.map(str::trim).filter(|s| !s.is_empty()) {
        user.push_str(&format!(
            "\n\nAdditional Instructions:\n{extra}\n\nMake sure to incorporate these instructions while maintaining the template structure."
        ));
    }

    PromptPair {
        system: PR_DESCRIPTION_SYSTEM.to_string(),
        user,
    }
}

/// Builds the issue-drafting prompt; the user's request is passed through
/// untouched.
///
/// A non-blank `project_context` (usually a cached project-context document)
/// is appended to the system instructions.
pub fn build_issue_prompt(prompt: &str, project_context: Option<&str>) -> PromptPair {
    let mut system = ISSUE_SYSTEM.to_string();
    if let Some(context) = project_context.filter(|c| !c.trim().is_empty()) {
        system.push_str(
            "\n\nUse the following project context to better understand the codebase and generate a relevant issue:\n\n",
        );
        system.push_str(context);
    }

    PromptPair {
        system,
        user: prompt.to_string(),
    }
}
