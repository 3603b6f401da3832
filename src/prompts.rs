use crate::{Error, Result};

/// Style wrapper applied to the edited character description.
pub const PORTRAIT_TEMPLATE: &str =
    "Portrait of {{description}}, by Greg Rutkowski, digital painting";

const DESCRIPTION_PLACEHOLDER: &str = "{{description}}";

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Wrap a character description in the portrait template.
pub fn portrait_prompt(template: &str, description: &str) -> String {
    render(template, &[("description", description)])
}

pub fn validate_portrait_template(template: &str) -> Result<()> {
    if template.contains(DESCRIPTION_PLACEHOLDER) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "portrait template must contain {}",
            DESCRIPTION_PLACEHOLDER
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_portrait_prompt_uses_fixed_template() {
        assert_eq!(
            portrait_prompt(PORTRAIT_TEMPLATE, "tall, stern, grey eyes"),
            "Portrait of tall, stern, grey eyes, by Greg Rutkowski, digital painting"
        );
    }

    #[test]
    fn test_default_template_is_valid() {
        assert!(validate_portrait_template(PORTRAIT_TEMPLATE).is_ok());
        assert!(validate_portrait_template("no placeholder").is_err());
    }
}
