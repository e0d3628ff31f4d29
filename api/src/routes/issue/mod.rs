pub mod issue_prompt_request;
pub mod issue_prompt_route;
