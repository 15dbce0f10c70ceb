//! Resources served to clients and the virtual hosts that own them.

pub mod disk;

use std::collections::HashMap;

use bytes::Bytes;
use tracing::warn;

/// Aliases this long or longer are not registered.
pub const MAX_HOST_ALIAS_LEN: usize = 122;

/// A file or generated page ready to be sent.
#[derive(Debug, Clone)]
pub struct Resource {
    location: String,
    mime_type: String,
    data: Bytes,
    is_directory: bool,
}

impl Resource {
    pub fn new(
        location: impl Into<String>,
        mime_type: impl Into<String>,
        data: Bytes,
        is_directory: bool,
    ) -> Self {
        Self {
            location: location.into(),
            mime_type: mime_type.into(),
            data,
            is_directory,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    /// Last path segment of the location.
    pub fn name(&self) -> &str {
        self.location
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }

    /// Text after the last `.` of [`name`](Self::name), if any.
    pub fn extension(&self) -> Option<&str> {
        self.name().rsplit_once('.').map(|(_, ext)| ext)
    }
}

/// Something that can turn a request URI into a [`Resource`].
///
/// Implementations must refuse URIs that try to climb out of their root and
/// report entries they may not read as missing.
pub trait ResourceHost {
    fn get_resource(&self, uri: &str) -> Option<Resource>;
}

/// Maps `host:port` names to resource hosts.
pub struct VirtualHosts {
    hosts: Vec<Box<dyn ResourceHost>>,
    names: HashMap<String, usize>,
    port: u16,
}

impl VirtualHosts {
    pub fn new(port: u16) -> Self {
        Self {
            hosts: Vec::new(),
            names: HashMap::new(),
            port,
        }
    }

    /// Adds a host reachable as `localhost`, `127.0.0.1` and each alias.
    ///
    /// Names already taken by an earlier host keep pointing at it.
    pub fn add_host(&mut self, host: Box<dyn ResourceHost>, aliases: &[String]) {
        let index = self.hosts.len();
        self.hosts.push(host);

        for name in ["localhost", "127.0.0.1"] {
            self.names.entry(format!("{name}:{}", self.port)).or_insert(index);
        }
        for alias in aliases.iter().map(|a| a.trim()).filter(|a| !a.is_empty()) {
            if alias.len() >= MAX_HOST_ALIAS_LEN {
                warn!(alias, "skipping virtual host alias, name too long");
                continue;
            }
            self.names.entry(format!("{alias}:{}", self.port)).or_insert(index);
        }
    }

    /// Looks up a `host:port` name exactly as given.
    pub fn resolve(&self, name: &str) -> Option<&dyn ResourceHost> {
        let index = *self.names.get(name)?;
        self.hosts.get(index).map(Box::as_ref)
    }

    /// The host used when a request does not name one.
    pub fn default_host(&self) -> Option<&dyn ResourceHost> {
        self.hosts.first().map(Box::as_ref)
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}
