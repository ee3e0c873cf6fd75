//! 单个样本的预览图导出.

use image::ImageResult;
use ndarray::ArrayView2;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式保存为灰度图的 2D 样本.
///
/// 对于 `f32` 强度图, 按样本自身的最小/最大值线性拉伸到 0..=255;
/// 对于 `u8` 标签图, 按标签个数均匀铺开灰度, 背景 0 为黑色.
/// 图像宽度对应第 1 轴 (列), 高度对应第 0 轴 (行).
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径. 格式由扩展名决定.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 按 `[lo, hi]` 将 `v` 线性映射到灰度. 区间退化时返回黑色.
#[inline]
fn stretch(v: f32, lo: f32, hi: f32) -> u8 {
    if !v.is_finite() || hi <= lo {
        return u8::MIN;
    }
    // 255, not 256.
    (((v - lo) / (hi - lo)).clamp(0.0, 1.0) * 255.0) as u8
}

/// 标签 `label` 在 `max_label` 为最大标签时的灰度.
#[inline]
fn pretty(label: u8, max_label: u8) -> u8 {
    if max_label == 0 {
        return u8::MIN;
    }
    ((label as u32 * 255) / max_label as u32) as u8
}

macro_rules! impl_intensity_vis {
    ($($view: ty),+) => {
        $(
            /// 按最小/最大值拉伸. 非有限值被忽略并显示为黑色.
            impl ImgWriteVis for $view {
                fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.dim();
                    let (lo, hi) = self
                        .iter()
                        .filter(|v| v.is_finite())
                        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                            (lo.min(v), hi.max(v))
                        });
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    for ((h, w), &v) in self.indexed_iter() {
                        buf.put_pixel(w as u32, h as u32, image::Luma([stretch(v, lo, hi)]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

macro_rules! impl_label_vis {
    ($($view: ty),+) => {
        $(
            /// 标签均匀铺开灰度, 最大标签为白色.
            impl ImgWriteVis for $view {
                fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.dim();
                    let max_label = self.iter().copied().max().unwrap_or(0);
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    for ((h, w), &l) in self.indexed_iter() {
                        buf.put_pixel(w as u32, h as u32, image::Luma([pretty(l, max_label)]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

impl_intensity_vis!(ArrayView2<'_, f32>);
impl_label_vis!(ArrayView2<'_, u8>);
