//! Inno Setup wrapper.
//!
//! The Inno Setup script itself lives with the platform scripts; the
//! wrapper's only job is to validate the property file so that a broken
//! configuration fails the build here rather than halfway through the
//! installer compile.

use tracing::info;

use crate::props::Properties;
use crate::PackError;

pub fn run(properties: &Properties) -> Result<(), PackError> {
    let app_name = properties.required("packaging.appName")?;
    let app_version = properties.required("packaging.appVersion")?;
    info!(
        "Inno Setup packaging for {} {} is driven by the platform scripts",
        app_name, app_version
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_complete_properties() {
        let properties = Properties::parse("packaging.appName=myapp\npackaging.appVersion=1.0.0");
        run(&properties).unwrap();
    }

    #[test]
    fn rejects_missing_name() {
        let properties = Properties::parse("packaging.appVersion=1.0.0");
        let err = run(&properties).unwrap_err();
        assert!(matches!(err, PackError::MissingProperty { ref key } if key == "packaging.appName"));
    }
}
