//! Test doubles: synthetic executables and a scripted prompter.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Write;

use tempfile::NamedTempFile;

use crate::flow::Prompter;
use crate::table::SemanticValueKind;

/// A header-only ELF image padded with zeros to `size` bytes
pub fn elf_image(machine: u16, is_64: bool, size: usize) -> Vec<u8> {
    let mut image = vec![0x7F, b'E', b'L', b'F', if is_64 { 2 } else { 1 }, 1, 1];
    image.resize(16, 0);
    image.extend_from_slice(&3u16.to_le_bytes()); // ET_DYN
    image.extend_from_slice(&machine.to_le_bytes());
    image.extend_from_slice(&1u32.to_le_bytes());

    if is_64 {
        image.extend_from_slice(&[0u8; 24]); // entry, phoff, shoff
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&64u16.to_le_bytes());
        image.extend_from_slice(&56u16.to_le_bytes());
        image.extend_from_slice(&0u16.to_le_bytes());
        image.extend_from_slice(&64u16.to_le_bytes());
    } else {
        image.extend_from_slice(&[0u8; 12]);
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&52u16.to_le_bytes());
        image.extend_from_slice(&32u16.to_le_bytes());
        image.extend_from_slice(&0u16.to_le_bytes());
        image.extend_from_slice(&40u16.to_le_bytes());
    }
    image.extend_from_slice(&0u16.to_le_bytes()); // shnum
    image.extend_from_slice(&0u16.to_le_bytes()); // shstrndx

    image.resize(size.max(image.len()), 0);
    image
}

/// Write [`elf_image`] to a temporary file
pub fn elf_file(machine: u16, is_64: bool, size: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&elf_image(machine, is_64, size)).unwrap();
    file.flush().unwrap();
    file
}

/// Prompter that replays canned answers and records what it was asked.
///
/// Runs out of answers as `None` (abort).
#[derive(Default)]
pub struct ScriptedPrompter {
    paths: RefCell<VecDeque<Option<String>>>,
    offsets: RefCell<VecDeque<Option<String>>>,
    path_retries: RefCell<Vec<bool>>,
    offset_prompts: RefCell<Vec<(SemanticValueKind, bool)>>,
    messages: RefCell<Vec<String>>,
    warnings: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(paths: Vec<Option<String>>, offsets: Vec<Option<String>>) -> Self {
        Self {
            paths: RefCell::new(paths.into()),
            offsets: RefCell::new(offsets.into()),
            ..Self::default()
        }
    }

    pub fn path_retries(&self) -> Vec<bool> {
        self.path_retries.borrow().clone()
    }

    pub fn offset_prompts(&self) -> Vec<(SemanticValueKind, bool)> {
        self.offset_prompts.borrow().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.borrow().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt_path(&self, retry: bool) -> Option<String> {
        self.path_retries.borrow_mut().push(retry);
        self.paths.borrow_mut().pop_front().flatten()
    }

    fn prompt_offsets(&self, kind: SemanticValueKind, retry: bool) -> Option<String> {
        self.offset_prompts.borrow_mut().push((kind, retry));
        self.offsets.borrow_mut().pop_front().flatten()
    }

    fn display_message(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }

    fn display_warning(&self, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }
}
