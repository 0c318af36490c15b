/*!
 * XML writer implementation for pkm-manifest
 */

use std::fs::{self, Permissions};
use std::io::Write;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tempfile::NamedTempFile;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::types::{DirectoryNode, FileNode, Node};

/// Name of the document element
pub const ROOT_ELEMENT: &str = "pkm_project";

const INDENT_WIDTH: usize = 4;

/// XML writer for directory contents
pub struct XmlWriter {
    /// Writer configuration
    config: Config,
}

impl XmlWriter {
    /// Create a new XML writer
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Render the tree and write it to the configured output file.
    ///
    /// The document goes to a temporary file next to the target first and
    /// is renamed into place, so a failure never leaves partial output.
    pub fn write(&self, root_node: &DirectoryNode) -> Result<()> {
        let document = render_document(root_node)?;
        let output = &self.config.output_file;

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(document.as_bytes())?;
        tmp.flush()?;
        // Temp files are created owner-only
        if let Some(permissions) = output_permissions(output) {
            tmp.as_file().set_permissions(permissions)?;
        }
        tmp.persist(output)?;

        info!(
            output = %output.display(),
            bytes = document.len(),
            "wrote XML document"
        );
        Ok(())
    }
}

/// Permissions for the finished document: those of the file it replaces,
/// or the usual mode of a freshly written file
fn output_permissions(output: &Path) -> Option<Permissions> {
    match fs::metadata(output) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}

/// Render the whole tree as a compacted, pretty-printed XML document
pub fn render_document(root_node: &DirectoryNode) -> Result<String> {
    let mut xml_writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH);

    xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    if root_node.contents.is_empty() {
        xml_writer.write_event(Event::Empty(BytesStart::new(ROOT_ELEMENT)))?;
    } else {
        xml_writer.write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))?;
        write_contents(&root_node.contents, &mut xml_writer)?;
        xml_writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
    }

    let bytes = xml_writer.into_inner();
    let xml = String::from_utf8(bytes)
        .map_err(|e| crate::error!(Writer, "rendered document is not UTF-8: {}", e))?;
    Ok(compact_blank_lines(&xml))
}

fn write_contents<W: Write>(contents: &[Node], writer: &mut Writer<W>) -> Result<()> {
    for node in contents {
        match node {
            Node::Directory(dir_node) => write_directory(dir_node, writer)?,
            Node::File(file_node) => write_file(file_node, writer)?,
        }
    }
    Ok(())
}

/// Write a directory node to XML
fn write_directory<W: Write>(dir: &DirectoryNode, writer: &mut Writer<W>) -> Result<()> {
    let mut start_tag = BytesStart::new("directory");
    start_tag.push_attribute(("name", dir.name.as_str()));

    if dir.contents.is_empty() {
        writer.write_event(Event::Empty(start_tag))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start_tag))?;
    write_contents(&dir.contents, writer)?;
    writer.write_event(Event::End(BytesEnd::new("directory")))?;
    Ok(())
}

/// Write a file node to XML, its content as CDATA on the element's own line
fn write_file<W: Write>(file: &FileNode, writer: &mut Writer<W>) -> Result<()> {
    let mut start_tag = BytesStart::new("file");
    start_tag.push_attribute(("name", file.name.as_str()));

    if file.content.is_empty() {
        writer.write_event(Event::Empty(start_tag))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start_tag))?;
    // Not Event::CData: the indenting writer would put it on a line of its
    // own. Text events are written verbatim, keeping the payload inline.
    writer.write_event(Event::Text(BytesText::from_escaped(cdata_sections(
        &file.content,
    ))))?;
    writer.write_event(Event::End(BytesEnd::new("file")))?;
    Ok(())
}

/// Wrap `text` in CDATA, splitting every `]]>` across two sections
pub fn cdata_sections(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

/// Drop every empty or whitespace-only line
pub fn compact_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
