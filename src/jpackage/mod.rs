//! # jpackage Wrappers
//!
//! Property-driven invocation of the JDK `jpackage` tool. Two flavors are
//! supported: an app image that is subsequently pruned and repackaged into
//! a reproducible tarball, and a Debian package built from the same
//! distribution plus an extras directory carrying the license, SBOM and a
//! generated README.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::props::Properties;
use crate::{archive, exec, PackError};

/// The kind of application being packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppType {
    /// A command-line application (`--win-console` on Windows).
    CommandLine,
}

impl AppType {
    fn parse(value: &str) -> Result<Self, PackError> {
        match value {
            "CommandLine" => Ok(AppType::CommandLine),
            other => Err(PackError::InvalidProperty {
                key: "packaging.appType".to_string(),
                value: other.to_string(),
                reason: "unrecognized application type".to_string(),
            }),
        }
    }
}

/// A `jpackage --type app-image` build: image creation, pruning, metadata
/// extras and the final reproducible tarball.
#[derive(Debug, Clone)]
pub struct AppImageJob {
    pub os: String,
    pub arch: String,
    pub app_name: String,
    pub app_version: String,
    pub main_module: String,
    pub app_type: AppType,
    pub jpackage: PathBuf,
    pub jre: PathBuf,
    pub jars: PathBuf,
    pub icon: PathBuf,
    pub resource_directory: PathBuf,
    pub output_directory: PathBuf,
    pub distribution: PathBuf,
    pub license_file: PathBuf,
    pub source_url: String,
    pub scripts_url: String,
}

impl AppImageJob {
    pub fn from_properties(properties: &Properties) -> Result<Self, PackError> {
        let jdk = properties.required_path("packaging.jdk")?;
        Ok(Self {
            os: properties.required("packaging.platform.os")?.to_string(),
            arch: properties.required("packaging.platform.arch")?.to_string(),
            app_name: properties.required("packaging.appName")?.to_string(),
            app_version: properties.required("packaging.appVersion")?.to_string(),
            main_module: properties.required("packaging.mainModule")?.to_string(),
            app_type: AppType::parse(properties.required("packaging.appType")?)?,
            jpackage: jdk.join("bin").join("jpackage"),
            jre: properties.required_path("packaging.jre")?,
            jars: properties.required_path("packaging.jars")?,
            icon: properties.required_path("packaging.icon64")?,
            resource_directory: properties.required_path("packaging.resourceDirectory")?,
            output_directory: properties.required_path("packaging.outputDirectory")?,
            distribution: properties.required_path("packaging.distribution")?,
            license_file: properties.required_path("packaging.licenseFile")?,
            source_url: properties.required("packaging.sourceURL")?.to_string(),
            scripts_url: properties.required("packaging.scriptsURL")?.to_string(),
        })
    }

    /// The image directory `jpackage` produces.
    pub fn output_image(&self) -> PathBuf {
        self.output_directory.join(&self.app_name)
    }

    /// The reproducible tarball written next to the image.
    pub fn output_archive(&self) -> PathBuf {
        self.output_directory.join(format!(
            "{}_{}_{}-{}.tgz",
            self.app_name, self.app_version, self.os, self.arch
        ))
    }

    pub fn arguments(&self) -> Vec<String> {
        self.arguments_for(cfg!(windows))
    }

    fn arguments_for(&self, windows: bool) -> Vec<String> {
        let mut arguments = vec![
            "--verbose".to_string(),
            "--type".to_string(),
            "app-image".to_string(),
            "--runtime-image".to_string(),
            self.jre.display().to_string(),
            "--icon".to_string(),
            self.icon.display().to_string(),
            "--name".to_string(),
            self.app_name.clone(),
            "--module".to_string(),
            self.main_module.clone(),
            "--module-path".to_string(),
            self.jars.display().to_string(),
            "--app-version".to_string(),
            effective_version(&self.app_version, windows),
            "--resource-dir".to_string(),
            self.resource_directory.display().to_string(),
            "--dest".to_string(),
            self.output_directory.display().to_string(),
        ];
        match self.app_type {
            AppType::CommandLine => {
                if windows {
                    arguments.push("--win-console".to_string());
                }
            }
        }
        arguments
    }

    pub fn run(&self) -> Result<(), PackError> {
        fs::create_dir_all(&self.resource_directory).map_err(|e| PackError::Io {
            source: e,
            path: self.resource_directory.clone(),
        })?;

        info!("executing jpackage");
        exec::run_logged("jpackage", &self.jpackage, &self.arguments())?;

        clean_up_image(&self.output_directory, &self.app_name)?;
        write_extras(
            &self.output_image().join("meta"),
            &self.distribution,
            &self.app_name,
            &self.app_version,
            &self.license_file,
            &self.source_url,
            &self.scripts_url,
        )?;
        archive::build(&self.output_image(), &self.output_archive())
    }
}

/// A `jpackage --type deb` build.
#[derive(Debug, Clone)]
pub struct DebJob {
    pub app_name: String,
    pub app_version: String,
    pub main_module: String,
    pub maintainer: String,
    pub jpackage: PathBuf,
    pub jre: PathBuf,
    pub jars: PathBuf,
    pub icon: PathBuf,
    pub resource_directory: PathBuf,
    pub output_directory: PathBuf,
    pub extras_directory: PathBuf,
    pub distribution: PathBuf,
    pub license_file: PathBuf,
    pub source_url: String,
    pub scripts_url: String,
}

impl DebJob {
    pub fn from_properties(properties: &Properties) -> Result<Self, PackError> {
        let jdk = properties.required_path("packaging.jdk")?;
        Ok(Self {
            app_name: properties.required("packaging.appName")?.to_string(),
            app_version: properties.required("packaging.appVersion")?.to_string(),
            main_module: properties.required("packaging.mainModule")?.to_string(),
            maintainer: properties.required("packaging.maintainer")?.to_string(),
            jpackage: jdk.join("bin").join("jpackage"),
            jre: properties.required_path("packaging.jre")?,
            jars: properties.required_path("packaging.jars")?,
            icon: properties.required_path("packaging.icon64")?,
            resource_directory: properties.required_path("packaging.resourceDirectory")?,
            output_directory: properties.required_path("packaging.outputDirectory")?,
            extras_directory: properties.required_path("packaging.extrasDirectory")?,
            distribution: properties.required_path("packaging.distribution")?,
            license_file: properties.required_path("packaging.licenseFile")?,
            source_url: properties.required("packaging.sourceURL")?.to_string(),
            scripts_url: properties.required("packaging.scriptsURL")?.to_string(),
        })
    }

    pub fn arguments(&self) -> Vec<String> {
        vec![
            "--verbose".to_string(),
            "--type".to_string(),
            "deb".to_string(),
            "--runtime-image".to_string(),
            self.jre.display().to_string(),
            "--icon".to_string(),
            self.icon.display().to_string(),
            "--name".to_string(),
            self.app_name.clone(),
            "--module".to_string(),
            self.main_module.clone(),
            "--module-path".to_string(),
            self.jars.display().to_string(),
            "--app-version".to_string(),
            self.app_version.clone(),
            "--resource-dir".to_string(),
            self.resource_directory.display().to_string(),
            "--dest".to_string(),
            self.output_directory.display().to_string(),
            "--linux-deb-maintainer".to_string(),
            self.maintainer.clone(),
            "--linux-package-name".to_string(),
            self.app_name.clone(),
            "--input".to_string(),
            self.extras_directory.display().to_string(),
        ]
    }

    pub fn run(&self) -> Result<(), PackError> {
        fs::create_dir_all(&self.resource_directory).map_err(|e| PackError::Io {
            source: e,
            path: self.resource_directory.clone(),
        })?;

        write_extras(
            &self.extras_directory,
            &self.distribution,
            &self.app_name,
            &self.app_version,
            &self.license_file,
            &self.source_url,
            &self.scripts_url,
        )?;

        info!("executing jpackage");
        exec::run_logged("jpackage", &self.jpackage, &self.arguments())
    }
}

/// Windows can't support anything other than purely numeric version
/// numbers embedded in executables.
fn effective_version(version: &str, windows: bool) -> String {
    if windows {
        version.replace("-SNAPSHOT", "")
    } else {
        version.to_string()
    }
}

/// Prune files from the produced image that serve no purpose at runtime.
/// Windows images are left untouched; reducing them is too prone to
/// failure.
fn clean_up_image(output_directory: &Path, app_name: &str) -> Result<(), PackError> {
    if cfg!(windows) {
        return Ok(());
    }

    let output_app = output_directory.join(app_name);
    let runtime = output_app.join("lib").join("runtime");
    let targets = [
        runtime.join("lib").join("server").join("classes.jsa"),
        runtime.join("lib").join("server").join("classes_nocoops.jsa"),
        runtime.join("bin"),
        runtime.join("legal"),
        runtime.join("conf").join("sdp"),
        output_app.join("lib").join("app").join(".jpackage.xml"),
    ];
    for target in &targets {
        remove_path(target)?;
    }
    Ok(())
}

/// Remove a file or directory tree; absent paths are ignored since the
/// image layout varies between JDK releases.
fn remove_path(path: &Path) -> Result<(), PackError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(PackError::Io {
                source: e,
                path: path.to_path_buf(),
            })
        }
    };

    info!("remove {}", path.display());
    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| PackError::Io {
        source: e,
        path: path.to_path_buf(),
    })
}

/// Write the metadata extras that accompany every artifact: the SBOM from
/// the distribution, the license text and a generated README.
fn write_extras(
    target: &Path,
    distribution: &Path,
    app_name: &str,
    app_version: &str,
    license_file: &Path,
    source_url: &str,
    scripts_url: &str,
) -> Result<(), PackError> {
    fs::create_dir_all(target).map_err(|e| PackError::Io {
        source: e,
        path: target.to_path_buf(),
    })?;

    copy_file(
        &distribution.join(app_name).join("bom.xml"),
        &target.join("bom.xml"),
    )?;
    copy_file(license_file, &target.join("LICENSE.txt"))?;

    fs::write(
        target.join("README.txt"),
        readme_text(app_name, app_version, source_url, scripts_url),
    )
    .map_err(|e| PackError::Io {
        source: e,
        path: target.join("README.txt"),
    })
}

fn copy_file(source: &Path, destination: &Path) -> Result<(), PackError> {
    fs::copy(source, destination).map_err(|e| PackError::Io {
        source: e,
        path: source.to_path_buf(),
    })?;
    Ok(())
}

fn readme_text(app_name: &str, app_version: &str, source_url: &str, scripts_url: &str) -> String {
    format!(
        "{} {}\n\
         \n\
         This is an application image produced using platform-specific packaging\n\
         scripts to repackage the original platform-independent binaries.\n\
         \n\
         The original platform-independent binaries were produced from the\n\
         sources at:\n\
         \n\
         \x20 {}\n\
         \n\
         Whilst the packaging scripts themselves are available at:\n\
         \n\
         \x20 {}\n",
        app_name, app_version, source_url, scripts_url
    )
}
