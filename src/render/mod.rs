pub mod context;
pub mod file;
pub mod walker;

pub use context::build_context;
pub use walker::{
    execute_plan, plan_render, render_template, validate_project_name, GeneratedProject,
    GenerationPlan, PlannedFile, RenderOptions, RenderOutcome, DEFAULT_PROJECT_NAME,
    NAME_PLACEHOLDER,
};
