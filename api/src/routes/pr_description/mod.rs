pub mod pr_prompt_request;
pub mod pr_prompt_route;
