//! Human-facing notification port trait.

use crate::domain::error::SwingtraderError;

pub trait Notifier {
    fn send(&self, text: &str) -> Result<(), SwingtraderError>;
}
