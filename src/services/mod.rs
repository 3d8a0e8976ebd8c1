pub mod llm_service;
pub mod prompt_builder;
pub mod response_recovery;
pub mod travel_service;
