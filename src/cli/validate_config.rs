//! `validate-config` command: parses and validates a configuration file
//! without starting anything, so it is safe to run in CI.

use crate::cli::ValidateConfigArgs;
use crate::config::ControlPlaneConfig;

pub fn handle_validate_config(args: &ValidateConfigArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = ControlPlaneConfig::load(Some(&args.config))?;
    config.validate()?;

    println!("{}: configuration is valid", args.config.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_passes() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            temp.path(),
            "[startup]\nextproc_image = \"aigateway/extproc:v1\"\n",
        )
        .unwrap();

        let args = ValidateConfigArgs { config: temp.path().to_path_buf() };
        assert!(handle_validate_config(&args).is_ok());
    }

    #[test]
    fn missing_required_field_fails() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[startup]\n").unwrap();

        let args = ValidateConfigArgs { config: temp.path().to_path_buf() };
        assert!(handle_validate_config(&args).is_err());
    }

    #[test]
    fn missing_file_fails() {
        let args = ValidateConfigArgs { config: "/nonexistent/control-plane.toml".into() };
        assert!(handle_validate_config(&args).is_err());
    }
}
