//! 程序运行函数.

use crate::report::SliceReport;
use hip_slices::prelude::*;
use ndarray::Axis;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// 预览图输出目录. 未设置时不导出.
const PREVIEW_DIR_ENV: &str = "SLICE_PREVIEW_DIR";

/// 每隔多少个样本导出一张预览图.
const PREVIEW_STRIDE_ENV: &str = "SLICE_PREVIEW_STRIDE";

const DEFAULT_STRIDE: usize = 1000;

/// 实际运行.
pub fn run(partition: &str) -> Result<SliceReport, DatasetError> {
    let layout = DatasetLayout::from_env_or_home().ok_or(DatasetError::NoRoot)?;
    log::info!("Dataset prefix: {}", layout.prefix().display());

    let (images, segs) = layout.load_img_seg_pair(partition, &PairOptions::default())?;

    if let Some(dir) = env::var_os(PREVIEW_DIR_ENV).filter(|d| !d.is_empty()) {
        let stride = env::var(PREVIEW_STRIDE_ENV)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&s| s > 0)
            .unwrap_or(DEFAULT_STRIDE);
        write_previews(Path::new(&dir), partition, stride, &images, &segs);
    }

    Ok(SliceReport::new(partition, &images, &segs))
}

/// 每 `stride` 个样本导出一对 (图像, 标签) 预览. 失败只记录警告.
fn write_previews(dir: &Path, partition: &str, stride: usize, images: &Batch, segs: &Batch) {
    if let Err(e) = fs::create_dir_all(dir) {
        log::warn!("Cannot create `{}`: {e}", dir.display());
        return;
    }
    let (Some(img), Some(seg)) = (images.view3(), segs.view3()) else {
        log::warn!("Previews need 3-D batches, skipped");
        return;
    };

    let file = |i: usize, kind: &str| -> PathBuf { dir.join(format!("{partition}_{i:05}_{kind}.png")) };
    let n = images.loaded().min(segs.loaded());
    for i in (0..n).step_by(stride) {
        let path = file(i, "img");
        if let Err(e) = img.index_axis(Axis(0), i).save(&path) {
            log::warn!("Cannot write `{}`: {e}", path.display());
        }

        let labels = seg.index_axis(Axis(0), i).mapv(|v| v.clamp(0.0, u8::MAX as f32) as u8);
        let path = file(i, "seg");
        if let Err(e) = labels.view().save(&path) {
            log::warn!("Cannot write `{}`: {e}", path.display());
        }
    }
    log::info!("Previews written to `{}`", dir.display());
}
