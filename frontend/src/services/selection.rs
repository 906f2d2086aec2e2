//! Tracks the single file chosen by the user.

use web_sys::{File, FileList, HtmlInputElement};

use crate::types::SelectedFile;

/// Holds zero or one [`SelectedFile`].
///
/// Every selection replaces the previous one.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionManager<B> {
    current: Option<SelectedFile<B>>,
}

impl<B> Default for SelectionManager<B> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<B> SelectionManager<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active selection, if any.
    pub fn current(&self) -> Option<&SelectedFile<B>> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Replace the active selection.
    pub fn select(&mut self, file: SelectedFile<B>) -> &SelectedFile<B> {
        self.current.insert(file)
    }

    /// Select the first of `files`. An empty list keeps the previous selection.
    pub fn select_first<I>(&mut self, files: I) -> Option<&SelectedFile<B>>
    where
        I: IntoIterator<Item = SelectedFile<B>>,
    {
        let file = files.into_iter().next()?;
        Some(self.select(file))
    }
}

impl SelectionManager<File> {
    /// Read the file chosen through the picker control.
    pub fn select_from_input(&mut self, input: &HtmlInputElement) -> Option<&SelectedFile<File>> {
        let files = input.files()?;
        let file = self.select_first(web_files(&files))?;
        log::debug!("Selected from picker: {} ({} bytes)", file.name, file.size);
        Some(file)
    }

    /// Take the first dropped file and mirror the dropped list into the picker.
    pub fn select_from_drop(
        &mut self,
        dropped: &FileList,
        input: Option<&HtmlInputElement>,
    ) -> Option<&SelectedFile<File>> {
        self.select_first(web_files(dropped))?;
        if let Some(input) = input {
            input.set_files(Some(dropped));
        }
        let file = self.current()?;
        log::debug!("Selected from drop: {} ({} bytes)", file.name, file.size);
        Some(file)
    }
}

/// Files of a browser list, in order.
fn web_files(files: &FileList) -> impl Iterator<Item = SelectedFile<File>> + '_ {
    (0..files.length())
        .filter_map(|index| files.get(index))
        .map(SelectedFile::from_web_file)
}
