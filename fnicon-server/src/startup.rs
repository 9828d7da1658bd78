//! One-time preparation before the server accepts requests.

use fnicon_core::CatalogRecord;
use fnicon_store::{DEFAULT_CATALOG, ensure_dir};
use tracing::{error, info, warn};

use crate::apply::{apply_settings, publish_script};
use crate::state::AppState;

/// Records of a freshly created default catalog.
pub fn default_records() -> Vec<CatalogRecord> {
    [
        (
            1,
            "飞牛论坛",
            "https://club.fnnas.com/",
            "https://img.on79.cfd/file/1760761140128_1_飞牛论坛.jpg",
        ),
        (
            2,
            "中科大测速",
            "http://test.ustc.edu.cn/",
            "https://img.on79.cfd/file/1760761140429_2_中科大测速.jpg",
        ),
        (
            3,
            "随机壁纸",
            "https://api.imlazy.ink/img",
            "https://img.on79.cfd/file/1760761144818_3_随机壁纸.jpg",
        ),
    ]
    .into_iter()
    .map(|(seq, title, url, icon)| {
        let mut record = CatalogRecord::new(seq, title, url, url);
        record.remote_icon_url = icon.to_string();
        record
    })
    .collect()
}

/// Creates the configuration directory and default catalog, mirrors
/// missing icons, then publishes the served tree.
///
/// Only a missing configuration directory that cannot be created is
/// fatal; every later step logs its failure and moves on.
pub async fn run(state: &AppState) -> anyhow::Result<()> {
    ensure_dir(&state.config.conf_dir).await?;

    let catalogs = state.service.catalogs();
    match catalogs
        .create_if_missing(DEFAULT_CATALOG, &default_records())
        .await
    {
        Ok(true) => info!(catalog = DEFAULT_CATALOG, "Created default catalog"),
        Ok(false) => {}
        Err(e) => warn!(error = %e, "Failed to create default catalog"),
    }

    match catalogs.list().await {
        Ok(names) => {
            for name in names {
                if let Err(e) = state.service.init_images(&name).await {
                    warn!(catalog = %name, error = %e, "Image initialization failed");
                }
            }
        }
        Err(e) => warn!(error = %e, "Failed to list catalogs"),
    }

    if let Err(e) = apply_settings(&state.config).await {
        error!(error = %e, "Applying settings at startup failed");
    }
    publish_script(&state.config).await;

    Ok(())
}
