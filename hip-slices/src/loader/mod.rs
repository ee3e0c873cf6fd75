//! 2D 切片批量加载.
//!
//! 先读入并处理第一个样本以确定输出形状, 一次性预分配 `N` 行的批数组,
//! 再逐个读入样本就地写入. 单线程, 顺序 I/O.

use std::path::Path;

use ndarray::{Array2, ArrayD, ArrayView3, ArrayView4, ArrayViewD, Axis, Ix3, Ix4, IxDyn, Slice};
use num::{Float, FromPrimitive};

use crate::channels::{to_channels, to_channels_checked, to_channels_with};
use crate::consts::EARLY_STOP_INDEX;
use crate::data::slice::{center_crop_cols, zscore_inplace};
use crate::data::Volume;
use crate::error::LoadError;
use crate::Affine;

mod options;

pub use options::{Geometry, LabelPolicy, LoadOptions};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 一批已加载的样本.
///
/// 数据形状为 `(N, rows, cols)`, one-hot 模式下为 `(N, rows, cols, channels)`.
/// `N` 等于输入路径个数; 提前终止且未截断时, 未加载的行保持为 0.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Batch {
    data: ArrayD<f32>,
    affines: Option<Vec<Affine>>,
    loaded: usize,
    channels: Option<usize>,
}

impl Batch {
    /// 批数组的不可变视图.
    #[inline]
    pub fn images(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    /// 以 `(N, rows, cols)` 视图访问. one-hot 批返回 `None`.
    #[inline]
    pub fn view3(&self) -> Option<ArrayView3<'_, f32>> {
        self.data.view().into_dimensionality::<Ix3>().ok()
    }

    /// 以 `(N, rows, cols, channels)` 视图访问. 非 one-hot 批返回 `None`.
    #[inline]
    pub fn view4(&self) -> Option<ArrayView4<'_, f32>> {
        self.data.view().into_dimensionality::<Ix4>().ok()
    }

    /// 第 `index` 个样本. 越界时返回 `None`.
    #[inline]
    pub fn sample(&self, index: usize) -> Option<ArrayViewD<'_, f32>> {
        (index < self.len()).then(|| self.data.index_axis(Axis(0), index))
    }

    /// 批数组第一维长度.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// 批是否为空. 成功加载的批至少包含一个样本, 因此总是 `false`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 实际读入并写入的样本数.
    #[inline]
    pub fn loaded(&self) -> usize {
        self.loaded
    }

    /// one-hot 通道数. 非 one-hot 批返回 `None`.
    #[inline]
    pub fn channels(&self) -> Option<usize> {
        self.channels
    }

    /// 已加载样本的仿射矩阵, 与批数组前 `loaded` 行一一对应. 未请求时返回 `None`.
    #[inline]
    pub fn affines(&self) -> Option<&[Affine]> {
        self.affines.as_deref()
    }

    /// 拆分为批数组和仿射矩阵列表.
    #[inline]
    pub fn into_parts(self) -> (ArrayD<f32>, Option<Vec<Affine>>) {
        (self.data, self.affines)
    }
}

/// 从 `paths` 依次读入 2D 切片, 组装为一个 `f32` 批数组.
///
/// `T` 为中间处理 (归一化、one-hot) 使用的数值精度, 最终结果总是 `f32`.
///
/// 每个样本依次经过:
///
/// 1. 读入; 3D 数据只保留第三轴的第 0 层;
/// 2. `opts.norm_image` 时单独做 z-score;
/// 3. `opts.categorical` 时展开为 one-hot, 通道数在整批内固定;
/// 4. 校验形状属于 `opts.geometry`, 然后沿列居中裁剪.
///
/// 任一样本出错都会立即返回 `Err`, 不返回部分结果.
pub fn load_data_2d<T, P>(paths: &[P], opts: &LoadOptions) -> Result<Batch, LoadError>
where
    T: Float + FromPrimitive,
    P: AsRef<Path>,
{
    let n = paths.len();
    let first_path = paths.first().ok_or(LoadError::EmptyInput)?.as_ref();
    log::info!(
        "Loading {n} volumes (normalize: {}, categorical: {})",
        opts.norm_image,
        opts.categorical
    );

    // 第一个样本决定整批的形状和通道数. 处理结果直接作为第 0 行, 不重复读取.
    let first = prepare::<T>(first_path, opts, opts.channels)?;
    let channels = first.channels;
    if let Some(k) = channels {
        let (rows, cols) = opts.geometry.output_shape();
        log::info!("Image shape: {rows}x{cols}x{k}");
    }

    let mut shape = Vec::with_capacity(first.data.ndim() + 1);
    shape.push(n);
    shape.extend_from_slice(first.data.shape());
    // 直接按 f32 分配, 样本写入时逐元素转换, 整批只占一份内存.
    let mut data = ArrayD::<f32>::zeros(IxDyn(&shape));
    let mut affines = opts.affines.then(|| Vec::with_capacity(n));

    let mut pending = Some(first);
    let mut loaded = 0usize;
    for (i, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        log::debug!("[{}/{n}] {}", i + 1, path.display());

        let sample = match pending.take() {
            Some(s) => s,
            None => prepare::<T>(path, opts, channels)?,
        };
        if sample.data.shape() != &shape[1..] {
            return Err(LoadError::Format {
                path: path.to_owned(),
                shape: sample.data.shape().to_vec(),
            });
        }
        data
            .index_axis_mut(Axis(0), i)
            .zip_mut_with(&sample.data, |dst, src| *dst = src.to_f32().unwrap_or(f32::NAN));
        if let Some(a) = affines.as_mut() {
            a.push(sample.affine);
        }
        loaded = i + 1;

        if opts.early_stop && i > EARLY_STOP_INDEX {
            log::info!("Early stop after {loaded} of {n} volumes");
            break;
        }
    }

    if opts.truncate && loaded < n {
        data = data.slice_axis(Axis(0), Slice::from(..loaded)).to_owned();
    }
    log::info!("Loaded {loaded} volumes into {:?}", data.shape());

    Ok(Batch {
        data,
        affines,
        loaded,
        channels,
    })
}

/// 处理完毕、可直接写入批数组的单个样本.
struct Prepared<T> {
    data: ArrayD<T>,
    affine: Affine,
    channels: Option<usize>,
}

/// 读入并处理单个样本. `channels` 为已固定的 one-hot 通道数.
fn prepare<T>(path: &Path, opts: &LoadOptions, channels: Option<usize>) -> Result<Prepared<T>, LoadError>
where
    T: Float + FromPrimitive,
{
    let volume = Volume::open(path).map_err(|source| LoadError::Nifti {
        path: path.to_owned(),
        source,
    })?;
    let (affine, slice) = volume.into_affine_and_slice();
    let slice = slice.map_err(|shape| LoadError::Format {
        path: path.to_owned(),
        shape,
    })?;

    let mut slice: Array2<T> = slice.mapv(|v| T::from_f64(v).unwrap_or_else(T::nan));
    if opts.norm_image && !zscore_inplace(&mut slice) {
        log::warn!("`{}` has zero variance, only the mean was removed", path.display());
    }

    let spatial = slice.dim();
    let geometry = &opts.geometry;
    let format_error = |shape: &[usize]| LoadError::Format {
        path: path.to_owned(),
        shape: shape.to_vec(),
    };

    if opts.categorical {
        let onehot = match opts.labels {
            LabelPolicy::Strict => {
                to_channels_checked::<T, _>(&slice, channels).map_err(|source| LoadError::Label {
                    path: path.to_owned(),
                    source,
                })?
            }
            LabelPolicy::Lenient => match channels {
                Some(k) => to_channels_with::<T, _>(&slice, k),
                None => to_channels::<T, _>(&slice),
            },
        };
        log::debug!("Image shape: {:?}", onehot.shape());

        if !geometry.accepts(spatial) {
            return Err(format_error(onehot.shape()));
        }
        let k = onehot.len_of(Axis(2));
        let data = center_crop_cols(&onehot, geometry.crop_to)
            .ok_or_else(|| format_error(onehot.shape()))?
            .to_owned()
            .into_dyn();
        Ok(Prepared {
            data,
            affine,
            channels: Some(k),
        })
    } else {
        if !geometry.accepts(spatial) {
            return Err(format_error(slice.shape()));
        }
        let data = center_crop_cols(&slice, geometry.crop_to)
            .ok_or_else(|| format_error(slice.shape()))?
            .to_owned()
            .into_dyn();
        Ok(Prepared {
            data,
            affine,
            channels: None,
        })
    }
}
