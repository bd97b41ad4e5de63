use crate::dataset::DatasetRecord;
use crate::reading::Reading;

/// Progress notifications emitted while a readout session runs
///
/// Events arrive in protocol order: zero or more `DatasetAdded`, then
/// exactly one `Finished` or `Failed`. Presentation layers subscribe to
/// these; the engine never depends on who is listening.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// One block line was consumed and recorded
    DatasetAdded(DatasetRecord),
    /// The session completed and produced a reading
    Finished(Reading),
    /// The session aborted; carries the rendered error
    Failed(String),
}

impl SessionEvent {
    /// True for the two terminal events
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionEvent::Finished(_) | SessionEvent::Failed(_))
    }
}
