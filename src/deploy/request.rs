//! Packs a file set and its options into a submittable deploy payload

use base64::{Engine as _, engine::general_purpose};
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::collector::FileSet;
use super::error::Result;
use super::options::DeploymentOptions;

/// Metadata API namespace used by the deploy operations
pub const METADATA_NS: &str = "http://soap.sforce.com/2006/04/metadata";

/// A deploy ready to be submitted: the zipped file set plus its options
#[derive(Debug, Clone)]
pub struct DeployRequest {
    zip_file: String,
    file_count: usize,
    options: DeploymentOptions,
}

impl DeployRequest {
    /// Zip every file of `files` (keys become archive entry names) and pair
    /// the base64 encoded archive with `options`. No I/O beyond memory.
    pub fn build(files: &FileSet, options: &DeploymentOptions) -> Result<Self> {
        let archive = zip_files(files)?;
        Ok(Self {
            zip_file: general_purpose::STANDARD.encode(archive),
            file_count: files.len(),
            options: options.clone(),
        })
    }

    /// Base64 encoded zip archive
    pub fn zip_file(&self) -> &str {
        &self.zip_file
    }

    pub fn file_count(&self) -> usize {
        self.file_count
    }

    pub fn options(&self) -> &DeploymentOptions {
        &self.options
    }

    /// Raw archive bytes
    pub fn archive(&self) -> Result<Vec<u8>> {
        general_purpose::STANDARD
            .decode(&self.zip_file)
            .map_err(|e| super::DeployError::Archive(e.to_string()))
    }

    /// `<deploy>` element for the SOAP body
    pub fn to_soap_body(&self) -> String {
        let options = &self.options;
        let mut body = String::with_capacity(self.zip_file.len() + 512);
        body.push_str(&format!("<deploy xmlns=\"{}\">", METADATA_NS));
        body.push_str("<ZipFile>");
        body.push_str(&self.zip_file);
        body.push_str("</ZipFile>");
        body.push_str("<DeployOptions>");
        push_flag(&mut body, "allowMissingFiles", options.allow_missing_files());
        push_flag(&mut body, "autoUpdatePackage", options.auto_update_package());
        push_flag(&mut body, "checkOnly", options.check_only());
        push_flag(&mut body, "ignoreWarnings", options.ignore_warnings());
        push_flag(&mut body, "purgeOnDelete", options.purge_on_delete());
        push_flag(&mut body, "rollbackOnError", options.rollback_on_error());
        for test in options.run_tests() {
            body.push_str(&format!("<runTests>{}</runTests>", escape(test.as_str())));
        }
        // entries sit at the archive root rather than under a package folder
        push_flag(&mut body, "singlePackage", true);
        body.push_str(&format!("<testLevel>{}</testLevel>", options.test_level()));
        body.push_str("</DeployOptions>");
        body.push_str("</deploy>");
        body
    }
}

fn push_flag(body: &mut String, name: &str, value: bool) {
    body.push_str(&format!("<{name}>{value}</{name}>"));
}

fn zip_files(files: &FileSet) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let entry_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, contents) in files.iter() {
        writer.start_file(path, entry_options)?;
        writer
            .write_all(contents)
            .map_err(|e| super::DeployError::Archive(format!("{}: {}", path, e)))?;
    }

    Ok(writer.finish()?.into_inner())
}
