use log::{debug, warn};

use crate::error::OverlayError;

/// Current position in the scanned image list.
///
/// Owned by the viewer and handed the list length once; `next`/`previous`
/// wrap around both ends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Navigator {
    len: usize,
    index: usize,
}

impl Navigator {
    pub fn new(len: usize) -> Self {
        Self { len, index: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current(&self) -> Option<usize> {
        if self.is_empty() { None } else { Some(self.index) }
    }

    pub fn next(&mut self) -> Result<usize, OverlayError> {
        if self.is_empty() {
            return Err(OverlayError::EmptyFolder);
        }
        self.index = (self.index + 1) % self.len;
        debug!("next -> {}", self.index);
        Ok(self.index)
    }

    pub fn previous(&mut self) -> Result<usize, OverlayError> {
        if self.is_empty() {
            return Err(OverlayError::EmptyFolder);
        }
        self.index = if self.index == 0 { self.len - 1 } else { self.index - 1 };
        debug!("previous -> {}", self.index);
        Ok(self.index)
    }

    /// Selects `index` directly. Out-of-range requests leave the position
    /// unchanged.
    pub fn jump_to(&mut self, index: usize) -> Result<usize, OverlayError> {
        if self.is_empty() {
            return Err(OverlayError::EmptyFolder);
        }
        if index >= self.len {
            warn!("ignoring jump to {} of {}", index, self.len);
        } else {
            self.index = index;
        }
        Ok(self.index)
    }

    /// "Image k/N", 1-based.
    pub fn position_label(&self) -> String {
        match self.current() {
            Some(i) => format!("Image {}/{}", i + 1, self.len),
            None => "Image 0/0".to_owned(),
        }
    }
}
