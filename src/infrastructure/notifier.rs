use crate::domain::ports::OtpNotifier;
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Writes one-time codes to the log instead of sending mail.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl OtpNotifier for LogNotifier {
    async fn send_otp(&self, email: &str, name: &str, otp_code: &str) -> Result<()> {
        info!(%email, "OTP email for {email} ({name}): {otp_code}");
        Ok(())
    }
}
