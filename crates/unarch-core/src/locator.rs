//! Locating a decode engine from a ranked candidate list.
//!
//! Decode engines are optional, build-dependent components, so a session
//! walks an ordered candidate list and takes the first one that probes
//! successfully. The default list has a single entry, the engine built
//! from the codec backends compiled into this crate; alternate lists
//! exist so embedders can rank their own engines and so failure handling
//! stays testable.

use crate::ErrorKind;
use crate::engine::DecodeEngine;

/// One candidate location for a decode engine.
pub struct EngineCandidate {
    name: &'static str,
    probe: fn() -> Result<DecodeEngine, String>,
}

impl EngineCandidate {
    /// Creates a candidate from a name and a probe function. The probe
    /// either yields a ready engine or a diagnostic explaining why this
    /// candidate is unavailable.
    #[must_use]
    pub fn new(name: &'static str, probe: fn() -> Result<DecodeEngine, String>) -> Self {
        Self { name, probe }
    }

    /// The engine assembled from this crate's compiled-in format backends.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new("builtin", DecodeEngine::builtin)
    }

    /// Candidate name, used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for EngineCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineCandidate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The default ranked candidate list.
#[must_use]
pub fn default_candidates() -> Vec<EngineCandidate> {
    vec![EngineCandidate::builtin()]
}

/// Tries each candidate in order and returns the first engine that probes
/// successfully.
///
/// # Errors
///
/// Returns [`ErrorKind::LibraryNotFound`] carrying the last candidate's
/// diagnostic when every probe fails (or the list is empty).
pub fn locate(candidates: &[EngineCandidate]) -> Result<DecodeEngine, ErrorKind> {
    let mut last_failure = String::from("no engine candidates configured");

    for candidate in candidates {
        match (candidate.probe)() {
            Ok(engine) => return Ok(engine),
            Err(diag) => last_failure = format!("{}: {diag}", candidate.name),
        }
    }

    Err(ErrorKind::LibraryNotFound(last_failure))
}
