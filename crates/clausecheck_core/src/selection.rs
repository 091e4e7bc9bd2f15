use std::fmt;

/// Identifier handed to a local file when it is accepted into the selection.
/// Purely client-side; the backend id only exists after upload.
pub type LocalFileId = u64;

/// File extensions the backend accepts.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "txt"];

/// Upload size ceiling enforced locally before any network call.
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Where the documents for the next run come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    #[default]
    Upload,
    SelectExisting,
}

/// Single-document analysis or multi-document comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisType {
    #[default]
    Single,
    Multi,
}

impl AnalysisType {
    pub fn min_documents(self) -> usize {
        match self {
            AnalysisType::Single => 1,
            AnalysisType::Multi => 2,
        }
    }

    pub fn max_documents(self) -> usize {
        match self {
            AnalysisType::Single => 1,
            AnalysisType::Multi => 10,
        }
    }

    /// Client-side iteration budget for the 1 s poll loop.
    pub fn poll_budget(self) -> u32 {
        match self {
            AnalysisType::Single => 120,
            AnalysisType::Multi => 180,
        }
    }
}

/// Last known backend status of an already-stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// A file picked locally but not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub local_id: LocalFileId,
    pub name: String,
    pub size_bytes: u64,
    pub payload: Vec<u8>,
}

/// A document that already lives on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingDocument {
    pub id: String,
    pub name: String,
    pub last_status: DocumentStatus,
}

/// One entry of a validated request, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentRef {
    Local(LocalFile),
    Existing { document_id: String },
}

/// A validated, ready-to-submit request. Consumed read-only by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub mode: AnalysisMode,
    pub analysis_type: AnalysisType,
    pub documents: Vec<DocumentRef>,
}

/// Local rejection raised while building the selection.
///
/// Warnings are soft (selection full); errors name an offending file or an
/// out-of-bounds count. Neither ever reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSignal {
    Warning(String),
    Error(String),
}

impl fmt::Display for SelectionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionSignal::Warning(text) => write!(f, "warning: {text}"),
            SelectionSignal::Error(text) => write!(f, "error: {text}"),
        }
    }
}

/// Document selection across both axes: {Upload, SelectExisting} x
/// {Single, Multi}. The upload list and the existing list are independent;
/// switching mode never migrates entries between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    mode: AnalysisMode,
    analysis_type: AnalysisType,
    local_files: Vec<LocalFile>,
    existing: Vec<ExistingDocument>,
    next_local_id: LocalFileId,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::default(),
            analysis_type: AnalysisType::default(),
            local_files: Vec::new(),
            existing: Vec::new(),
            next_local_id: 1,
        }
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn analysis_type(&self) -> AnalysisType {
        self.analysis_type
    }

    pub fn local_files(&self) -> &[LocalFile] {
        &self.local_files
    }

    /// Existing documents in click order.
    pub fn existing_documents(&self) -> &[ExistingDocument] {
        &self.existing
    }

    pub fn set_mode(&mut self, mode: AnalysisMode) {
        self.mode = mode;
    }

    /// Switching Multi -> Single keeps only the earliest entry of each list.
    pub fn set_analysis_type(&mut self, analysis_type: AnalysisType) {
        if self.analysis_type == AnalysisType::Multi && analysis_type == AnalysisType::Single {
            self.local_files.truncate(1);
            self.existing.truncate(1);
        }
        self.analysis_type = analysis_type;
    }

    /// Validates and appends a local file; the returned id is client-local.
    pub fn add_local_file(
        &mut self,
        name: String,
        size_bytes: u64,
        payload: Vec<u8>,
    ) -> Result<LocalFileId, SelectionSignal> {
        if self.local_files.len() >= self.analysis_type.max_documents() {
            return Err(SelectionSignal::Warning(format!(
                "at most {} document(s) can be selected",
                self.analysis_type.max_documents()
            )));
        }
        let extension = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        let allowed = extension
            .as_deref()
            .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext));
        if !allowed {
            return Err(SelectionSignal::Error(format!(
                "unsupported file type for '{name}'; allowed: pdf, docx, txt"
            )));
        }
        if size_bytes > MAX_FILE_SIZE_BYTES {
            return Err(SelectionSignal::Error(format!(
                "'{name}' exceeds the 10 MB upload limit"
            )));
        }

        let local_id = self.next_local_id;
        self.next_local_id += 1;
        self.local_files.push(LocalFile {
            local_id,
            name,
            size_bytes,
            payload,
        });
        Ok(local_id)
    }

    pub fn remove_local_file(&mut self, local_id: LocalFileId) {
        self.local_files.retain(|file| file.local_id != local_id);
    }

    /// Selects or deselects an existing document. Returns `true` when the
    /// document ends up selected.
    pub fn toggle_existing(
        &mut self,
        document: ExistingDocument,
    ) -> Result<bool, SelectionSignal> {
        if let Some(position) = self.existing.iter().position(|doc| doc.id == document.id) {
            self.existing.remove(position);
            return Ok(false);
        }
        if self.existing.len() >= self.analysis_type.max_documents() {
            return Err(SelectionSignal::Warning(format!(
                "at most {} document(s) can be selected",
                self.analysis_type.max_documents()
            )));
        }
        self.existing.push(document);
        Ok(true)
    }

    /// Number of documents the active mode would submit.
    pub fn active_count(&self) -> usize {
        match self.mode {
            AnalysisMode::Upload => self.local_files.len(),
            AnalysisMode::SelectExisting => self.existing.len(),
        }
    }

    pub fn count_within_bounds(&self) -> bool {
        let count = self.active_count();
        count >= self.analysis_type.min_documents()
            && count <= self.analysis_type.max_documents()
    }

    /// Snapshots the active list into a request, enforcing count bounds.
    pub fn build_request(&self) -> Result<AnalysisRequest, SelectionSignal> {
        if !self.count_within_bounds() {
            return Err(SelectionSignal::Error(format!(
                "select between {} and {} document(s), currently {}",
                self.analysis_type.min_documents(),
                self.analysis_type.max_documents(),
                self.active_count()
            )));
        }
        let documents = match self.mode {
            AnalysisMode::Upload => self
                .local_files
                .iter()
                .cloned()
                .map(DocumentRef::Local)
                .collect(),
            AnalysisMode::SelectExisting => self
                .existing
                .iter()
                .map(|doc| DocumentRef::Existing {
                    document_id: doc.id.clone(),
                })
                .collect(),
        };
        Ok(AnalysisRequest {
            mode: self.mode,
            analysis_type: self.analysis_type,
            documents,
        })
    }

    /// Drops both lists; the mode/type axes and the id counter survive.
    pub fn clear(&mut self) {
        self.local_files.clear();
        self.existing.clear();
    }
}
