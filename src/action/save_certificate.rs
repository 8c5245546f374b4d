//! Certificate persistence action

use crate::action::issue_certificate::{ISSUED_CERTIFICATE, ISSUED_PRIVATE_KEY};
use crate::action::{Action, ActionArgs, ActionError, Decision};
use crate::core::{Context, ContextKey};
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

pub const ARGS_CERTIFICATE_TARGET_PATH: &str = "certificate-target-path";
pub const ARGS_CERTIFICATE_KEY_TARGET_PATH: &str = "certificate-key-target-path";

const CERTIFICATE_MODE: u32 = 0o644;
const PRIVATE_KEY_MODE: u32 = 0o600;

/// Writes the certificate and key issued earlier in the run to disk
#[derive(Debug, Clone, Default)]
pub struct SaveCertificateAction;

impl SaveCertificateAction {
    pub fn new() -> Self {
        Self
    }
}

fn required_value<'a>(ctx: &'a Context, key: &ContextKey<Vec<u8>>) -> Result<&'a [u8], ActionError> {
    ctx.get_value(key)
        .map(Vec::as_slice)
        .ok_or_else(|| ActionError::MissingContextObject(key.name().to_string()))
}

#[async_trait]
impl Action for SaveCertificateAction {
    fn name(&self) -> &str {
        "save-certificate"
    }

    fn description(&self) -> &str {
        "Write the issued certificate and private key to disk"
    }

    async fn run(&self, ctx: &mut Context, args: &ActionArgs) -> Result<Decision, ActionError> {
        let certificate_path = args.required(ARGS_CERTIFICATE_TARGET_PATH)?;
        let private_key_path = args.required(ARGS_CERTIFICATE_KEY_TARGET_PATH)?;
        let certificate = required_value(ctx, &ISSUED_CERTIFICATE)?;
        let private_key = required_value(ctx, &ISSUED_PRIVATE_KEY)?;

        debug!("Saving certificate to target path: [{}]", certificate_path);
        write_file(Path::new(certificate_path), certificate, CERTIFICATE_MODE)
            .await
            .map_err(|e| {
                error!("Writing certificate to file failed: {}", e);
                e
            })?;

        debug!("Saving certificate key to target path: [{}]", private_key_path);
        write_file(Path::new(private_key_path), private_key, PRIVATE_KEY_MODE)
            .await
            .map_err(|e| {
                error!("Writing certificate key to file failed: {}", e);
                e
            })?;

        Ok(Decision::Continue)
    }
}

async fn write_file(path: &Path, contents: &[u8], mode: u32) -> Result<(), ActionError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut file = open_restricted(path, mode).await?;
    file.write_all(contents).await?;
    file.flush().await?;

    Ok(())
}

/// Open `path` for writing, truncated and already carrying `mode`
///
/// An existing file keeps its old mode on open, so the mode is applied to
/// the handle before any content goes in.
async fn open_restricted(path: &Path, mode: u32) -> Result<fs::File, ActionError> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(mode);

    let file = options.open(path).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(mode)).await?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(file)
}
