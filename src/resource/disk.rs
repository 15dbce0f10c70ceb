use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::http::mime;
use crate::resource::{Resource, ResourceHost};

/// Files tried, in order, when a directory is requested.
pub const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

const OWNER_READ: u32 = 0o400;

/// Serves files below a base directory.
#[derive(Debug, Clone)]
pub struct DiskHost {
    base_path: PathBuf,
}

impl DiskHost {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn read_file(&self, path: &Path, uri: &str) -> io::Result<Resource> {
        let data = fs::read(path)?;
        Ok(Resource::new(uri, mime::for_path(path), Bytes::from(data), false))
    }

    fn read_directory(&self, path: &Path, uri: &str) -> io::Result<Resource> {
        for index in INDEX_FILES {
            let candidate = path.join(index);
            if candidate.is_file() && readable(&candidate) {
                return self.read_file(&candidate, uri);
            }
        }
        let listing = directory_listing(path, uri)?;
        Ok(Resource::new(uri, "text/html", Bytes::from(listing), true))
    }
}

impl ResourceHost for DiskHost {
    fn get_resource(&self, uri: &str) -> Option<Resource> {
        if uri.starts_with("..") || uri.contains("../") || uri.contains("/..") {
            debug!(uri, "rejected path traversal");
            return None;
        }

        let uri = uri.split_once('?').map_or(uri, |(path, _)| path);
        let path = self.base_path.join(uri.trim_start_matches('/'));
        let metadata = fs::metadata(&path).ok()?;
        if metadata.permissions().mode() & OWNER_READ == 0 {
            debug!(path = %path.display(), "not readable");
            return None;
        }

        let result = if metadata.is_dir() {
            self.read_directory(&path, uri)
        } else {
            self.read_file(&path, uri)
        };
        match result {
            Ok(resource) => Some(resource),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "read failed");
                None
            }
        }
    }
}

fn readable(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.permissions().mode() & OWNER_READ != 0)
}

/// HTML page linking to the parent and to every entry, sorted by name.
fn directory_listing(path: &Path, uri: &str) -> io::Result<String> {
    let mut names = fs::read_dir(path)?
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    names.sort();

    let title = escape_html(uri);
    let base = escape_html(uri.trim_end_matches('/'));
    let mut page = format!(
        "<html><head><title>{title}</title></head><body><a href=\"{base}/..\">..</a><br>"
    );
    for name in names.iter().map(|n| escape_html(n)) {
        page.push_str(&format!("<a href=\"{base}/{name}\">{name}</a><br>"));
    }
    page.push_str("</body></html>");
    Ok(page)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
