use tera::Context;

use crate::variables::VariableSet;

pub fn build_context(variables: &VariableSet) -> Context {
    let mut context = Context::new();
    for (key, value) in variables.iter() {
        context.insert(key, value);
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_exposes_every_variable() {
        let mut vars = VariableSet::new();
        vars.insert("name", "demo");
        vars.insert("version", "0.1.0");

        let context = build_context(&vars);
        assert_eq!(context.get("name").and_then(|v| v.as_str()), Some("demo"));
        assert!(context.contains_key("version"));
        assert!(!context.contains_key("author"));
    }
}
