pub mod engine;
pub mod prompter;

pub use engine::{
    collect_variables, ConfigurationProvider, FixedProvider, PromptOptions, PromptingProvider,
    VariableRequest,
};
pub use prompter::{Answer, DefaultsPrompter, InquirePrompter, Prompter, ScriptedPrompter};
