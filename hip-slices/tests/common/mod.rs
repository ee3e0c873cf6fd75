//! 集成测试共用的 nifti 构造工具.

#![allow(dead_code)]

use ndarray::{Array2, Array3};
use nifti::writer::WriterOptions;
use nifti::NiftiHeader;
use std::path::{Path, PathBuf};

/// 初始化日志. 多次调用无副作用.
pub fn init_log() {
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init();
}

/// 带 sform 的 header, 平移量为 `(tx, ty, 0)`.
pub fn sform_header(tx: f32, ty: f32) -> NiftiHeader {
    NiftiHeader {
        sform_code: 1,
        srow_x: [0.5, 0.0, 0.0, tx],
        srow_y: [0.0, 0.5, 0.0, ty],
        srow_z: [0.0, 0.0, 2.0, 0.0],
        ..NiftiHeader::default()
    }
}

macro_rules! impl_writer {
    ($($name: ident, $name_with: ident => $arr: ty),+ $(,)?) => {
        $(
            /// 将 `data` 写入 `dir/name`, 扩展名为 `.gz` 时压缩.
            pub fn $name(dir: &Path, name: &str, data: &$arr) -> PathBuf {
                $name_with(dir, name, data, &NiftiHeader::default())
            }

            /// 同上, 但以 `header` 为参考 header.
            pub fn $name_with(dir: &Path, name: &str, data: &$arr, header: &NiftiHeader) -> PathBuf {
                let path = dir.join(name);
                WriterOptions::new(&path)
                    .reference_header(header)
                    .write_nifti(data)
                    .unwrap();
                path
            }
        )+
    };
}

impl_writer!(
    write_f32_2d, write_f32_2d_with => Array2<f32>,
    write_f32_3d, write_f32_3d_with => Array3<f32>,
    write_u8_2d, write_u8_2d_with => Array2<u8>,
    write_u8_3d, write_u8_3d_with => Array3<u8>,
);

/// `(rows, cols)` 的强度图, 值为 `base + 列号`, 便于检查裁剪位置.
pub fn ramp(rows: usize, cols: usize, base: f32) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(_, w)| base + w as f32)
}

/// `(rows, cols)` 的标签图, 标签按 `(h + w) % k` 循环.
pub fn stripes(rows: usize, cols: usize, k: u8) -> Array2<u8> {
    Array2::from_shape_fn((rows, cols), |(h, w)| ((h + w) % k as usize) as u8)
}
