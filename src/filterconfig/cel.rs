//! Minimal CEL syntax check. `spec.md` §4.6: "for `cel`, compile the
//! expression and fail the build on syntax error." No CEL evaluator exists
//! in this crate's dependency stack, so this validates only the syntactic
//! shape a well-formed CEL expression must have — balanced delimiters and a
//! non-empty body — rather than compiling to an evaluable program.

use super::error::FilterConfigError;

pub fn validate(metadata_key: &str, expression: &str) -> Result<(), FilterConfigError> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(FilterConfigError::CelCompileError(
            metadata_key.to_string(),
            "empty expression".to_string(),
        ));
    }

    let mut depth_paren = 0i32;
    let mut depth_bracket = 0i32;
    let mut depth_brace = 0i32;
    for ch in trimmed.chars() {
        match ch {
            '(' => depth_paren += 1,
            ')' => depth_paren -= 1,
            '[' => depth_bracket += 1,
            ']' => depth_bracket -= 1,
            '{' => depth_brace += 1,
            '}' => depth_brace -= 1,
            _ => {}
        }
        if depth_paren < 0 || depth_bracket < 0 || depth_brace < 0 {
            return Err(FilterConfigError::CelCompileError(
                metadata_key.to_string(),
                format!("unbalanced delimiter at '{ch}'"),
            ));
        }
    }
    if depth_paren != 0 || depth_bracket != 0 || depth_brace != 0 {
        return Err(FilterConfigError::CelCompileError(
            metadata_key.to_string(),
            "unbalanced delimiters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_expression() {
        assert!(validate("k", "request.model == 'gpt-4'").is_ok());
    }

    #[test]
    fn rejects_empty_expression() {
        assert!(validate("k", "   ").is_err());
    }

    #[test]
    fn rejects_unbalanced_parens() {
        assert!(validate("k", "has(request.model").is_err());
    }

    #[test]
    fn rejects_closing_before_opening() {
        assert!(validate("k", "request.model)").is_err());
    }
}
