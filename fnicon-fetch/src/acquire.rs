//! Image acquisition: downloading a resolved icon to its local path.

use std::path::Path;

use tracing::{error, info, instrument, warn};

use crate::error::FetchError;
use crate::fetcher::Fetcher;

/// Downloads `source_url` to `dest`.
///
/// The parent directory of `dest` must exist. Failures are logged here;
/// callers decide whether they matter.
///
/// # Errors
///
/// Returns the underlying [`FetchError`] if the download fails.
#[instrument(skip(fetcher, dest), fields(dest = %dest.display()))]
pub async fn acquire(fetcher: &dyn Fetcher, source_url: &str, dest: &Path) -> Result<(), FetchError> {
    match fetcher.fetch_to_file(source_url, dest).await {
        Ok(()) => {
            info!(source = %source_url, "Icon acquired");
            Ok(())
        }
        Err(e) if e.is_remote() => {
            warn!(source = %source_url, error = %e, "Icon acquisition failed");
            Err(e)
        }
        Err(e) => {
            error!(source = %source_url, error = %e, "Icon could not be written locally");
            Err(e)
        }
    }
}
