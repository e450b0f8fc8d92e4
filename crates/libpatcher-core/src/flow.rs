//! Interactive patch flow.
//!
//! ```text
//! AwaitingPath -> AwaitingArchitectureOk -> AwaitingOffsets -> Patching -> Done
//!      ^                  |                   |   ^
//!      +------------------+                   +---+  (same kind, invalid list)
//! ```
//!
//! Any prompt may return `None` to abort. The prompter is the only place
//! that talks to the user, and each transition consumes the current state
//! plus at most one answer.

use std::path::PathBuf;

use tracing::debug;

use crate::arch::BinaryInspector;
use crate::engine::{PatchContext, PatchEngine, PreviewEntry};
use crate::error::{Error, Result};
use crate::offset::{OffsetRequest, validate_offsets};
use crate::report::PatchReport;
use crate::table::SemanticValueKind;

/// Input typed at the path prompt to abort
pub const ABORT_INPUT: &str = "x";

/// User interaction needed by [`PatchFlow`]
pub trait Prompter {
    /// Ask for the executable path. `retry` is set after a rejected answer.
    fn prompt_path(&self, retry: bool) -> Option<String>;

    /// Ask for the offsets of one kind. An empty answer means none.
    fn prompt_offsets(&self, kind: SemanticValueKind, retry: bool) -> Option<String>;

    fn display_message(&self, message: &str);

    fn display_warning(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowMode {
    #[default]
    Apply,
    /// Read current bytes only
    Preview,
}

#[derive(Debug)]
pub enum FlowResult {
    Applied(PatchReport),
    Previewed {
        context: PatchContext,
        entries: Vec<PreviewEntry>,
    },
}

#[derive(Debug)]
pub enum FlowState {
    AwaitingPath {
        retry: bool,
    },
    AwaitingArchitectureOk {
        path: PathBuf,
    },
    AwaitingOffsets {
        context: PatchContext,
        request: OffsetRequest,
        next: usize,
        retry: bool,
    },
    Patching {
        context: PatchContext,
        request: OffsetRequest,
    },
    Done(FlowResult),
    Aborted,
}

impl FlowState {
    pub fn start() -> Self {
        Self::AwaitingPath { retry: false }
    }

    /// Start with a path supplied up front
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self::AwaitingArchitectureOk { path: path.into() }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Aborted)
    }
}

pub struct PatchFlow<'a, P: Prompter + ?Sized, I: BinaryInspector + ?Sized> {
    prompter: &'a P,
    inspector: &'a I,
    mode: FlowMode,
    kinds: Vec<SemanticValueKind>,
}

impl<'a, P: Prompter + ?Sized, I: BinaryInspector + ?Sized> PatchFlow<'a, P, I> {
    pub fn new(prompter: &'a P, inspector: &'a I) -> Self {
        Self {
            prompter,
            inspector,
            mode: FlowMode::default(),
            kinds: SemanticValueKind::all().collect(),
        }
    }

    pub fn with_mode(mut self, mode: FlowMode) -> Self {
        self.mode = mode;
        self
    }

    /// Run from the first prompt until done. `Ok(None)` means aborted.
    pub fn run(&self) -> Result<Option<FlowResult>> {
        self.run_from(FlowState::start())
    }

    pub fn run_from(&self, mut state: FlowState) -> Result<Option<FlowResult>> {
        loop {
            state = match self.step(state)? {
                FlowState::Done(result) => return Ok(Some(result)),
                FlowState::Aborted => return Ok(None),
                next => next,
            };
        }
    }

    /// Advance one transition.
    ///
    /// Only failures to open or flush the target are returned as errors.
    pub fn step(&self, state: FlowState) -> Result<FlowState> {
        debug!("Flow step: {}", state_name(&state));

        let next = match state {
            FlowState::AwaitingPath { retry } => self.on_path(retry),
            FlowState::AwaitingArchitectureOk { path } => self.on_architecture(path),
            FlowState::AwaitingOffsets {
                context,
                request,
                next,
                retry,
            } => self.on_offsets(context, request, next, retry),
            FlowState::Patching { context, request } => self.on_patching(context, request)?,
            terminal => terminal,
        };
        Ok(next)
    }

    fn on_path(&self, retry: bool) -> FlowState {
        let Some(input) = self.prompter.prompt_path(retry) else {
            return FlowState::Aborted;
        };
        let input = input.trim();

        if input.eq_ignore_ascii_case(ABORT_INPUT) {
            FlowState::Aborted
        } else if input.is_empty() {
            self.prompter.display_warning("File path empty.");
            FlowState::AwaitingPath { retry: true }
        } else {
            FlowState::with_path(input)
        }
    }

    fn on_architecture(&self, path: PathBuf) -> FlowState {
        match PatchContext::resolve(self.inspector, path) {
            Ok(context) => {
                self.prompter.display_message(&format!(
                    "Detected architecture: {}\nPatches of {} will be applied.",
                    context.arch(),
                    context.arch().family_name()
                ));
                FlowState::AwaitingOffsets {
                    context,
                    request: OffsetRequest::new(),
                    next: 0,
                    retry: false,
                }
            }
            Err(e) => {
                let message = match &e {
                    Error::UnsupportedArchitecture { machine } => {
                        format!("Detected architecture: {}\nPatches are not available.", machine)
                    }
                    Error::FileNotExecutable { .. } => "File is not executable.".to_string(),
                    e if e.is_not_found() => "Invalid file path.".to_string(),
                    e => format!("An error occurred while reading the file: {}", e),
                };
                self.prompter.display_warning(&message);
                FlowState::AwaitingPath { retry: true }
            }
        }
    }

    fn on_offsets(
        &self,
        context: PatchContext,
        mut request: OffsetRequest,
        next: usize,
        retry: bool,
    ) -> FlowState {
        let Some(&kind) = self.kinds.get(next) else {
            return FlowState::Patching { context, request };
        };

        let Some(input) = self.prompter.prompt_offsets(kind, retry) else {
            return FlowState::Aborted;
        };
        let input = input.trim();

        // add_raw leaves the request untouched when parsing fails
        if !validate_offsets(input) || request.add_raw(kind.name(), input).is_err() {
            self.prompter
                .display_warning("Invalid offsets format. Please enter valid offsets.");
            return FlowState::AwaitingOffsets {
                context,
                request,
                next,
                retry: true,
            };
        }

        FlowState::AwaitingOffsets {
            context,
            request,
            next: next + 1,
            retry: false,
        }
    }

    fn on_patching(&self, context: PatchContext, request: OffsetRequest) -> Result<FlowState> {
        let engine = PatchEngine::new(&context);
        let result = match self.mode {
            FlowMode::Apply => FlowResult::Applied(engine.apply(&request)?),
            FlowMode::Preview => {
                let entries = engine.preview(&request)?;
                FlowResult::Previewed { context, entries }
            }
        };
        Ok(FlowState::Done(result))
    }
}

fn state_name(state: &FlowState) -> &'static str {
    match state {
        FlowState::AwaitingPath { .. } => "AwaitingPath",
        FlowState::AwaitingArchitectureOk { .. } => "AwaitingArchitectureOk",
        FlowState::AwaitingOffsets { .. } => "AwaitingOffsets",
        FlowState::Patching { .. } => "Patching",
        FlowState::Done(_) => "Done",
        FlowState::Aborted => "Aborted",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::ObjectInspector;
    use crate::mock::{ScriptedPrompter, elf_file};
    use crate::table::encode_hex;
    use goblin::elf::header::{EM_AARCH64, EM_ARM, EM_X86_64};

    fn offsets_with(first: &[(SemanticValueKind, &str)]) -> Vec<Option<String>> {
        SemanticValueKind::all()
            .map(|kind| {
                let answer = first
                    .iter()
                    .find(|(k, _)| *k == kind)
                    .map(|(_, raw)| raw.to_string())
                    .unwrap_or_default();
                Some(answer)
            })
            .collect()
    }

    #[test]
    fn test_full_run_applies_patch() {
        let file = elf_file(EM_AARCH64, true, 0x400);
        let path = file.path().to_string_lossy().to_string();

        let prompter = ScriptedPrompter::new(
            vec![Some(path)],
            offsets_with(&[(SemanticValueKind::IntegerZero, "0x100")]),
        );
        let result = PatchFlow::new(&prompter, &ObjectInspector).run().unwrap();

        let Some(FlowResult::Applied(report)) = result else {
            panic!("expected an applied report");
        };
        assert_eq!(report.applied_count(), 1);
        let bytes = std::fs::read(file.path()).unwrap();
        assert_eq!(encode_hex(&bytes[0x100..0x108]), "00008052C0035FD6");
        assert!(prompter.messages().iter().any(|m| m.contains("arm64-v8a")));
    }

    #[test]
    fn test_unsupported_file_goes_back_to_path() {
        let x86 = elf_file(EM_X86_64, true, 0x400);
        let arm = elf_file(EM_ARM, false, 0x400);

        let prompter = ScriptedPrompter::new(
            vec![
                Some(x86.path().to_string_lossy().to_string()),
                Some(arm.path().to_string_lossy().to_string()),
            ],
            offsets_with(&[]),
        );
        let flow = PatchFlow::new(&prompter, &ObjectInspector);

        let state = flow.step(FlowState::start()).unwrap();
        assert!(matches!(state, FlowState::AwaitingArchitectureOk { .. }));
        let state = flow.step(state).unwrap();
        assert!(matches!(state, FlowState::AwaitingPath { retry: true }));
        assert!(
            prompter
                .warnings()
                .iter()
                .any(|w| w.contains("AMD x86-64") && w.contains("not available"))
        );

        let state = flow.step(flow.step(state).unwrap()).unwrap();
        let FlowState::AwaitingOffsets { context, .. } = state else {
            panic!("expected offsets prompt");
        };
        assert_eq!(context.arch(), crate::arch::Arch::Arm32);
    }

    #[test]
    fn test_empty_path_and_abort() {
        let prompter = ScriptedPrompter::new(
            vec![Some(String::new()), Some("X".to_string())],
            Vec::new(),
        );
        let result = PatchFlow::new(&prompter, &ObjectInspector).run().unwrap();
        assert!(result.is_none());
        assert_eq!(prompter.warnings()[0], "File path empty.");
        assert_eq!(prompter.path_retries(), vec![false, true]);
    }

    #[test]
    fn test_not_executable_reprompts() {
        let mut text = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut text, b"plain text, nothing to see").unwrap();

        let prompter = ScriptedPrompter::new(
            vec![Some(text.path().to_string_lossy().to_string()), None],
            Vec::new(),
        );
        let result = PatchFlow::new(&prompter, &ObjectInspector).run().unwrap();
        assert!(result.is_none());
        assert!(prompter.warnings().contains(&"File is not executable.".to_string()));
    }

    #[test]
    fn test_invalid_offsets_repeat_same_kind() {
        let file = elf_file(EM_AARCH64, true, 0x400);
        let mut answers = vec![Some("200".to_string()), Some("0x200".to_string())];
        answers.extend((1..10).map(|_| Some(String::new())));

        let prompter = ScriptedPrompter::new(Vec::new(), answers);
        let result = PatchFlow::new(&prompter, &ObjectInspector)
            .with_mode(FlowMode::Preview)
            .run_from(FlowState::with_path(file.path()))
            .unwrap();

        let Some(FlowResult::Previewed { entries, .. }) = result else {
            panic!("expected a preview");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].offset, 0x200);
        assert_eq!(
            prompter.offset_prompts()[..2],
            [
                (SemanticValueKind::BooleanTrue, false),
                (SemanticValueKind::BooleanTrue, true)
            ]
        );
        // Preview never writes
        assert!(std::fs::read(file.path()).unwrap()[0x200..0x208].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_offset_wider_than_64_bits_repeats_same_kind() {
        let file = elf_file(EM_AARCH64, true, 0x400);
        let mut answers = vec![
            Some("0x1FFFFFFFFFFFFFFFFF".to_string()),
            Some("0x100".to_string()),
        ];
        answers.extend((1..10).map(|_| Some(String::new())));

        let prompter = ScriptedPrompter::new(Vec::new(), answers);
        let result = PatchFlow::new(&prompter, &ObjectInspector)
            .run_from(FlowState::with_path(file.path()))
            .unwrap();

        let Some(FlowResult::Applied(report)) = result else {
            panic!("expected an applied report");
        };
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].offset, 0x100);
        assert_eq!(
            prompter.offset_prompts()[..2],
            [
                (SemanticValueKind::BooleanTrue, false),
                (SemanticValueKind::BooleanTrue, true)
            ]
        );
        assert!(
            prompter
                .warnings()
                .contains(&"Invalid offsets format. Please enter valid offsets.".to_string())
        );
    }

    #[test]
    fn test_read_error_is_reported_and_reprompts() {
        let dir = tempfile::tempdir().unwrap();
        let prompter = ScriptedPrompter::new(
            vec![Some(dir.path().to_string_lossy().to_string()), None],
            Vec::new(),
        );
        let result = PatchFlow::new(&prompter, &ObjectInspector).run().unwrap();

        assert!(result.is_none());
        assert_eq!(prompter.path_retries(), vec![false, true]);
        assert!(
            prompter.warnings()[0].starts_with("An error occurred while reading the file: ")
        );
    }

    #[test]
    fn test_abort_during_offsets() {
        let file = elf_file(EM_AARCH64, true, 0x400);
        let prompter = ScriptedPrompter::new(Vec::new(), vec![Some("0x300".to_string()), None]);
        let result = PatchFlow::new(&prompter, &ObjectInspector)
            .run_from(FlowState::with_path(file.path()))
            .unwrap();
        assert!(result.is_none());
        assert!(std::fs::read(file.path()).unwrap()[0x300..0x308].iter().all(|&b| b == 0));
    }
}
