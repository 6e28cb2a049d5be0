use std::path::Path;

/// The report formats the simulator writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportKind {
    ContactTime,
    MessageCopy,
    MessageStats,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [
        ReportKind::ContactTime,
        ReportKind::MessageCopy,
        ReportKind::MessageStats,
    ];

    /// The substring identifying the kind in report file names
    /// (compared case-insensitively).
    pub fn file_name_marker(self) -> &'static str {
        match self {
            ReportKind::ContactTime => "contacttime",
            ReportKind::MessageCopy => "messagecopy",
            ReportKind::MessageStats => "messagestats",
        }
    }

    /// Guess the kind from the file name of `path`, e.g.
    /// `MessageCopyCountReport.txt`.
    pub fn from_file_name(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_string_lossy().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| file_name.contains(kind.file_name_marker()))
    }

    /// Whether several input files can be plotted together.
    pub fn supports_multiple_inputs(self) -> bool {
        match self {
            ReportKind::ContactTime => false,
            ReportKind::MessageCopy => true,
            ReportKind::MessageStats => false,
        }
    }

    pub fn default_title(self) -> &'static str {
        match self {
            ReportKind::ContactTime => "ContactTime",
            ReportKind::MessageCopy => "Message Copy Count",
            ReportKind::MessageStats => "Message Stats",
        }
    }
}
