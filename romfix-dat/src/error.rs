/// Errors that can occur while reading a catalog source or building a catalog.
///
/// Every variant is fatal for the run: a catalog that cannot be read in full
/// cannot be trusted for any set.
#[derive(Debug, thiserror::Error)]
pub enum DatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Invalid DAT file: {0}")]
    InvalidDat(String),

    #[error("Malformed digest for {set}/{entry}: {reason}")]
    MalformedDigest {
        set: String,
        entry: String,
        reason: String,
    },
}

impl DatError {
    pub fn invalid_dat(msg: impl Into<String>) -> Self {
        Self::InvalidDat(msg.into())
    }

    pub fn malformed_digest(
        set: impl Into<String>,
        entry: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedDigest {
            set: set.into(),
            entry: entry.into(),
            reason: reason.into(),
        }
    }
}
