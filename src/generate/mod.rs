pub mod components;
pub mod dependencies;

pub use components::{
    generate_component_files, plan_component_files, selected_components, Component,
};
pub use dependencies::{
    collect_dependencies, generate_dependency_file, plan_dependency_file, DependencyManager,
};
