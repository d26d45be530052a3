/// Progress update sent while the archive inventory is built.
#[derive(Debug, Clone)]
pub enum InventoryProgress {
    /// The directory listing is done
    Scanning {
        /// Number of archive files found
        archive_count: usize,
    },

    /// Listing the entries of one archive
    Reading {
        /// Archive (set) name
        name: String,
        /// Zero-based position of this archive
        index: usize,
        /// Total number of archives
        total: usize,
    },

    /// All archives have been listed
    Done,
}
