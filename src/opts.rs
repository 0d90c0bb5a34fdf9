use smart_default::SmartDefault;

use crate::constant::CapabilityFlags;
use crate::error::Error;

/// Capabilities assumed when none are configured
pub const DEFAULT_CAPABILITIES: CapabilityFlags =
    CapabilityFlags::CLIENT_PROTOCOL_41.union(CapabilityFlags::CLIENT_DEPRECATE_EOF);

/// A configuration for result set decoding
///
/// ```rs
/// let mut opts1 = Opts::default();
/// opts1.row_buffer_capacity = 4096;
///
/// let opts2 = Opts::try_from("deprecate_eof=false&row_buffer_capacity=1024")?;
/// ```
#[derive(Debug, Clone, SmartDefault)]
pub struct Opts {
    /// Negotiated capabilities of the session.
    /// `CLIENT_DEPRECATE_EOF` decides whether rows end with an OK packet or a legacy EOF packet.
    #[default(DEFAULT_CAPABILITIES)]
    pub capabilities: CapabilityFlags,

    /// Initial capacity of the packet buffer reused across rows
    #[default(256)]
    pub row_buffer_capacity: usize,
}

impl Opts {
    pub fn deprecate_eof(&self) -> bool {
        self.capabilities
            .contains(CapabilityFlags::CLIENT_DEPRECATE_EOF)
    }
}

impl TryFrom<&str> for Opts {
    type Error = Error;

    /// Parse `key=value` pairs separated by `&`, with an optional leading `?`
    fn try_from(query: &str) -> Result<Self, Self::Error> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut opts = Opts::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "deprecate_eof" => {
                    let enabled = value.parse::<bool>().map_err(|e| {
                        Error::BadConfigError(format!("Invalid deprecate_eof '{}': {}", value, e))
                    })?;
                    opts.capabilities
                        .set(CapabilityFlags::CLIENT_DEPRECATE_EOF, enabled);
                }
                "row_buffer_capacity" => {
                    opts.row_buffer_capacity = value.parse::<usize>().map_err(|e| {
                        Error::BadConfigError(format!(
                            "Invalid row_buffer_capacity '{}': {}",
                            value, e
                        ))
                    })?;
                }
                other => {
                    return Err(Error::BadConfigError(format!(
                        "Unknown option '{}'",
                        other
                    )));
                }
            }
        }

        Ok(opts)
    }
}
