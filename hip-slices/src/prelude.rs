//! 🩻欢迎光临🧲
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Affine, Idx2d};

pub use crate::channels::{from_channels, to_channels, to_channels_checked, to_channels_with};
pub use crate::data::{NiftiHeaderAttr, Volume};

#[cfg(feature = "preview")]
pub use crate::data::ImgWriteVis;

pub use crate::consts::{EARLY_STOP_INDEX, TARGET_COLS, TARGET_ROWS};
pub use crate::dataset::{self, DatasetLayout, PairMode, PairOptions, Partition};
pub use crate::error::{DatasetError, LabelError, LoadError, PartitionError};
pub use crate::loader::{load_data_2d, Batch, Geometry, LabelPolicy, LoadOptions};
