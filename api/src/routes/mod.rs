pub mod github;
pub mod issue;
pub mod pr_description;
pub mod project_context;
