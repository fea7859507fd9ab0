//! Notifier that writes through the logging layer.

use crate::domain::error::SwingtraderError;
use crate::ports::notifier_port::Notifier;

#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, text: &str) -> Result<(), SwingtraderError> {
        tracing::warn!(target: "swingtrader::notify", message = %text, "notification");
        Ok(())
    }
}
