//! WiX v4 source generation.
//!
//! Generates the `.wxs` file fed to the WiX toolset to build a Windows
//! installer: one component per regular file in the distribution, embedded
//! cab media, a downgrade guard and the usual Program Files directory
//! chain. WiX itself is run by the platform scripts; this module only
//! produces its input.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use walkdir::WalkDir;

use crate::props::Properties;
use crate::PackError;

const WIX_NAMESPACE: &str = "http://wixtoolset.org/schemas/v4/wxs";

/// A WiX source generation job, read from the packaging properties.
#[derive(Debug, Clone)]
pub struct WixJob {
    pub output_wix_file: PathBuf,
    pub app_name: String,
    pub app_long_name: String,
    pub app_version: String,
    pub upgrade_code: String,
    pub vendor: String,
    pub icon: PathBuf,
    pub distribution: PathBuf,
}

impl WixJob {
    pub fn from_properties(properties: &Properties) -> Result<Self, PackError> {
        let app_name = properties.required("packaging.appName")?.to_string();
        let distribution = properties
            .required_path("packaging.distribution")?
            .join(&app_name);
        Ok(Self {
            output_wix_file: properties.required_path("packaging.outputWixFile")?,
            app_long_name: properties.required("packaging.appLongName")?.to_string(),
            // MSI version fields must be numeric
            app_version: properties
                .required("packaging.appVersion")?
                .replace("-SNAPSHOT", ""),
            upgrade_code: properties.required("packaging.upgradeCode")?.to_string(),
            vendor: properties.required("packaging.vendor")?.to_string(),
            icon: properties.required_path("packaging.icon64")?,
            app_name,
            distribution,
        })
    }

    pub fn run(&self) -> Result<(), PackError> {
        let document = self.render()?;
        info!("writing {}", self.output_wix_file.display());
        fs::write(&self.output_wix_file, document).map_err(|e| PackError::Io {
            source: e,
            path: self.output_wix_file.clone(),
        })
    }

    /// Render the full `.wxs` document.
    pub fn render(&self) -> Result<String, PackError> {
        let files = collect_distribution_files(&self.distribution)?;

        let mut xml = XmlWriter::new();
        xml.start("Wix");
        xml.attr("xmlns", WIX_NAMESPACE);
        self.write_package(&mut xml);
        self.write_files_fragment(&mut xml, &files);
        xml.end();
        Ok(xml.finish())
    }

    fn write_package(&self, xml: &mut XmlWriter) {
        xml.start("Package");
        xml.attr("Language", "1033");
        xml.attr("Manufacturer", &self.vendor);
        xml.attr("Name", &self.app_long_name);
        xml.attr("Version", &self.app_version);
        xml.attr("UpgradeCode", &self.upgrade_code);

        // Disallow downgrades.
        xml.start("MajorUpgrade");
        xml.attr(
            "DowngradeErrorMessage",
            "A newer version of [ProductName] is already installed.",
        );
        xml.end();

        xml.start("Icon");
        xml.attr("Id", "Icon.ico");
        xml.attr("SourceFile", &self.icon.display().to_string());
        xml.end();

        xml.start("Property");
        xml.attr("Id", "ARPPRODUCTICON");
        xml.attr("Value", "Icon.ico");
        xml.end();

        // Embed all the data directly into the MSI file.
        xml.start("MediaTemplate");
        xml.attr("EmbedCab", "yes");
        xml.end();

        xml.start("StandardDirectory");
        xml.attr("Id", "ProgramFilesFolder");
        {
            xml.start("Directory");
            xml.attr("Id", "CompanyFolder");
            xml.attr("Name", &self.vendor);
            {
                xml.start("Directory");
                xml.attr("Id", "INSTALLLOCATION");
                xml.attr("Name", &self.app_long_name);
                xml.end();
            }
            xml.end();
        }
        xml.end();

        xml.start("Feature");
        xml.attr("Id", "Application");
        xml.attr("Title", "Application");
        xml.attr("Level", "1");
        xml.attr("ConfigurableDirectory", "INSTALLLOCATION");
        {
            xml.start("ComponentGroupRef");
            xml.attr("Id", "Files");
            xml.end();
        }
        xml.end();

        xml.end();
    }

    fn write_files_fragment(&self, xml: &mut XmlWriter, files: &[PathBuf]) {
        xml.start("Fragment");
        xml.start("ComponentGroup");
        xml.attr("Id", "Files");

        for file in files {
            xml.start("Component");
            xml.attr("Directory", "INSTALLLOCATION");

            if let Ok(relative) = file.strip_prefix(&self.distribution) {
                if let Some(parent) = relative.parent() {
                    if parent != Path::new("") {
                        xml.attr("Subdirectory", &parent.display().to_string());
                    }
                }
            }

            xml.start("File");
            xml.attr("Source", &file.display().to_string());
            xml.attr("KeyPath", "yes");
            xml.end();

            xml.end();
        }

        xml.end();
        xml.end();
    }
}

/// Every regular file under the distribution, sorted by path so that the
/// generated document is stable between runs.
fn collect_distribution_files(distribution: &Path) -> Result<Vec<PathBuf>, PackError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(distribution).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| distribution.to_path_buf());
            PackError::Io {
                source: e.into(),
                path,
            }
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort_by(|a, b| {
        a.as_os_str()
            .as_encoded_bytes()
            .cmp(b.as_os_str().as_encoded_bytes())
    });
    Ok(files)
}

/// A minimal streaming XML writer: elements, attributes, escaping,
/// two-space indentation. Enough for WiX sources; no text nodes needed.
struct XmlWriter {
    buffer: String,
    stack: Vec<&'static str>,
    tag_open: bool,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            buffer: "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n".to_string(),
            stack: Vec::new(),
            tag_open: false,
        }
    }

    fn start(&mut self, name: &'static str) {
        self.close_open_tag();
        for _ in 0..self.stack.len() {
            self.buffer.push_str("  ");
        }
        self.buffer.push('<');
        self.buffer.push_str(name);
        self.stack.push(name);
        self.tag_open = true;
    }

    fn attr(&mut self, name: &str, value: &str) {
        self.buffer.push(' ');
        self.buffer.push_str(name);
        self.buffer.push_str("=\"");
        self.buffer.push_str(&escape(value));
        self.buffer.push('"');
    }

    fn end(&mut self) {
        let Some(name) = self.stack.pop() else {
            return;
        };
        if self.tag_open {
            self.buffer.push_str("/>\n");
            self.tag_open = false;
        } else {
            for _ in 0..self.stack.len() {
                self.buffer.push_str("  ");
            }
            self.buffer.push_str("</");
            self.buffer.push_str(name);
            self.buffer.push_str(">\n");
        }
    }

    fn close_open_tag(&mut self) {
        if self.tag_open {
            self.buffer.push_str(">\n");
            self.tag_open = false;
        }
    }

    fn finish(self) -> String {
        self.buffer
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
